//! Full-screen black overlay used for fade in/out between scenes

/// Linear opacity fade, driven by real time
#[derive(Debug, Clone)]
pub struct Curtain {
    alpha: f32,
    from: f32,
    target: f32,
    duration: f32,
    elapsed: f32,
}

impl Curtain {
    pub fn new(alpha: f32) -> Self {
        let alpha = alpha.clamp(0.0, 1.0);
        Self {
            alpha,
            from: alpha,
            target: alpha,
            duration: 0.0,
            elapsed: 0.0,
        }
    }

    /// Start fading toward `target` over `duration` seconds
    pub fn fade_to(&mut self, target: f32, duration: f32) {
        self.from = self.alpha;
        self.target = target.clamp(0.0, 1.0);
        self.duration = duration.max(0.0);
        self.elapsed = 0.0;
        if self.duration == 0.0 {
            self.alpha = self.target;
        }
    }

    pub fn update(&mut self, real_dt: f32) {
        if !self.is_fading() {
            return;
        }
        self.elapsed = (self.elapsed + real_dt).min(self.duration);
        let t = self.elapsed / self.duration;
        self.alpha = self.from + (self.target - self.from) * t;
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_fading(&self) -> bool {
        self.alpha != self.target
    }
}
