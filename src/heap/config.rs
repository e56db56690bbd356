/// Tuning knobs for the generational collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcConfig {
    /// Number of young objects that triggers a collection.
    pub young_threshold: usize,
    /// Number of old objects that forces the next collection to be a major one.
    pub old_threshold: usize,
    /// Minor collections a young object must survive before it is promoted.
    pub promotion_age: u32,
    /// Consecutive minor collections after which the next collection is a major one.
    pub major_every: u32,
}

impl GcConfig {
    pub const DEFAULT_YOUNG_THRESHOLD: usize = 1024;
    pub const DEFAULT_OLD_THRESHOLD: usize = 10240;
    pub const DEFAULT_PROMOTION_AGE: u32 = 3;
    pub const DEFAULT_MAJOR_EVERY: u32 = 5;

    pub fn with_young_threshold(mut self, young_threshold: usize) -> Self {
        self.young_threshold = young_threshold.max(1);
        self
    }

    pub fn with_old_threshold(mut self, old_threshold: usize) -> Self {
        self.old_threshold = old_threshold.max(1);
        self
    }

    pub fn with_promotion_age(mut self, promotion_age: u32) -> Self {
        self.promotion_age = promotion_age.max(1);
        self
    }

    pub fn with_major_every(mut self, major_every: u32) -> Self {
        self.major_every = major_every.max(1);
        self
    }
}

impl std::default::Default for GcConfig {
    fn default() -> Self {
        Self {
            young_threshold: Self::DEFAULT_YOUNG_THRESHOLD,
            old_threshold: Self::DEFAULT_OLD_THRESHOLD,
            promotion_age: Self::DEFAULT_PROMOTION_AGE,
            major_every: Self::DEFAULT_MAJOR_EVERY,
        }
    }
}
