use std::fmt;
use std::sync::atomic::{ AtomicU64, Ordering };

/// Rendering counters.
///
/// Each `ShapeArena` owns one set. Counters are atomic and are bumped through
/// shared references while shading.
#[derive(Debug, Default)]
pub struct Statistics {
    primitive_tests: AtomicU64,
    bounds_tests: AtomicU64,
    bounds_culled: AtomicU64,
    rays: AtomicU64,
    shadow_rays: AtomicU64,
    precomputes: AtomicU64,
}

macro_rules! counter {
    ($record:ident, $get:ident, $field:ident) => {
        pub fn $record(&self) {
            self.$field.fetch_add(1, Ordering::Relaxed);
        }

        pub fn $get(&self) -> u64 {
            self.$field.load(Ordering::Relaxed)
        }
    };
}

impl Statistics {
    counter!(record_primitive_test, primitive_tests, primitive_tests);
    counter!(record_bounds_test, bounds_tests, bounds_tests);
    counter!(record_bounds_culled, bounds_culled, bounds_culled);
    counter!(record_ray, rays, rays);
    counter!(record_shadow_ray, shadow_rays, shadow_rays);
    counter!(record_precompute, precomputes, precomputes);

    pub fn reset(&self) {
        for counter in [
            &self.primitive_tests,
            &self.bounds_tests,
            &self.bounds_culled,
            &self.rays,
            &self.shadow_rays,
            &self.precomputes,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,
            "rays: {}, shadow rays: {}, primitive tests: {}, \
             bounds tests: {} ({} culled), precomputes: {}",
            self.rays(),
            self.shadow_rays(),
            self.primitive_tests(),
            self.bounds_tests(),
            self.bounds_culled(),
            self.precomputes())
    }
}

#[test]
fn counters_record_and_reset() {
    let stats = Statistics::default();
    stats.record_ray();
    stats.record_ray();
    stats.record_bounds_culled();

    assert_eq!(stats.rays(), 2);
    assert_eq!(stats.bounds_culled(), 1);
    assert_eq!(stats.shadow_rays(), 0);

    stats.reset();
    assert_eq!(stats.rays(), 0);
    assert_eq!(stats.bounds_culled(), 0);
}
