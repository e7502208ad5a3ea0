//! Integer generators: uniform, power law, and partitioned power law.

use rand::Rng;
use workload_core::{GeneratedValue, ParamSpec};

use super::Generator;
use crate::error::{require, ConstructionError};
use crate::factory::GeneratorFactory;
use crate::WorkloadRng;

const UNIFORM: &str = "number/uniform";
const POWER_LAW: &str = "number/power_law";
const PARTITION_POWER_LAW: &str = "number/partition_power_law";

/// Uniform integers in `[min, max]`.
#[derive(Debug, Clone)]
pub struct UniformGenerator {
    min: i64,
    max: i64,
}

impl UniformGenerator {
    pub fn new(min: i64, max: i64) -> Result<Self, ConstructionError> {
        if min > max {
            return Err(ConstructionError::invalid(
                UNIFORM,
                format!("min ({min}) cannot be greater than max ({max})"),
            ));
        }
        Ok(Self { min, max })
    }

    pub fn sample(&self, rng: &mut WorkloadRng) -> i64 {
        if self.min == self.max {
            return self.min;
        }
        rng.random_range(self.min..=self.max)
    }
}

impl Generator for UniformGenerator {
    fn generate(&self, rng: &mut WorkloadRng) -> GeneratedValue {
        GeneratedValue::Int(self.sample(rng))
    }
}

/// Power-law integers in `[min, max]`, sampled through the inverse CDF.
///
/// For a uniform `y` in `[0, 1)` and exponent `a`:
/// `x = ((max^(1-a) - 1) * y + 1)^(1/(1-a))`, and the result is
/// `round(x) + min - 1` clamped into `[min, max]`.
#[derive(Debug, Clone)]
pub struct PowerLawGenerator {
    min: i64,
    max: i64,
    /// `max^(1-a) - 1`
    scale: f64,
    /// `1 / (1-a)`
    inverse_exponent: f64,
}

impl PowerLawGenerator {
    pub fn new(min: i64, max: i64, exponent: f64) -> Result<Self, ConstructionError> {
        if min <= 0 || min > max {
            return Err(ConstructionError::invalid(
                POWER_LAW,
                format!("min={min}, max={max} (must be > 0, min <= max)"),
            ));
        }
        validate_exponent(POWER_LAW, exponent)?;

        let one_minus_exponent = 1.0 - exponent;
        Ok(Self {
            min,
            max,
            scale: (max as f64).powf(one_minus_exponent) - 1.0,
            inverse_exponent: 1.0 / one_minus_exponent,
        })
    }

    pub fn sample(&self, rng: &mut WorkloadRng) -> i64 {
        let y: f64 = rng.random();
        let x = (y * self.scale + 1.0).powf(self.inverse_exponent);
        // `as` saturates on overflow and maps NaN to 0; the clamp covers both.
        (x.round() as i64)
            .saturating_add(self.min - 1)
            .clamp(self.min, self.max)
    }
}

impl Generator for PowerLawGenerator {
    fn generate(&self, rng: &mut WorkloadRng) -> GeneratedValue {
        GeneratedValue::Int(self.sample(rng))
    }
}

/// Power law applied inside one of `partition` equal buckets of `[min, max]`.
///
/// The bucket is chosen uniformly per draw. The last bucket absorbs the
/// remainder of the range.
#[derive(Debug, Clone)]
pub struct PartitionedPowerLawGenerator {
    min: i64,
    max: i64,
    partition: i64,
    exponent: f64,
    bucket_size: i128,
}

impl PartitionedPowerLawGenerator {
    pub fn new(min: i64, max: i64, partition: i64, exponent: f64) -> Result<Self, ConstructionError> {
        if min > max || partition <= 0 {
            return Err(ConstructionError::invalid(
                PARTITION_POWER_LAW,
                format!("min={min}, max={max}, partition={partition}"),
            ));
        }
        validate_exponent(PARTITION_POWER_LAW, exponent)?;

        let span = max as i128 - min as i128 + 1;
        Ok(Self {
            min,
            max,
            partition,
            exponent,
            bucket_size: (span / partition as i128).max(1),
        })
    }

    /// Number of buckets.
    pub fn partition(&self) -> i64 {
        self.partition
    }

    /// Inclusive bounds of `bucket` (in `0..partition`).
    ///
    /// Buckets that start past `max` collapse onto `max`.
    pub fn bucket_bounds(&self, bucket: i64) -> (i64, i64) {
        let max = self.max as i128;
        let mut lo = self.min as i128 + bucket as i128 * self.bucket_size;
        let mut hi = lo + self.bucket_size - 1;
        if hi > max || bucket == self.partition - 1 {
            hi = max;
        }
        if lo > hi {
            lo = hi;
        }
        (lo as i64, hi as i64)
    }

    pub fn sample(&self, rng: &mut WorkloadRng) -> i64 {
        let bucket = rng.random_range(0..self.partition);
        let (lo, hi) = self.bucket_bounds(bucket);
        match PowerLawGenerator::new(lo, hi, self.exponent) {
            Ok(power_law) => power_law.sample(rng),
            // Only buckets reaching below 1 end up here.
            Err(_) => rng.random_range(lo..=hi),
        }
    }
}

impl Generator for PartitionedPowerLawGenerator {
    fn generate(&self, rng: &mut WorkloadRng) -> GeneratedValue {
        GeneratedValue::Int(self.sample(rng))
    }
}

fn validate_exponent(mode: &'static str, exponent: f64) -> Result<(), ConstructionError> {
    if !exponent.is_finite() {
        return Err(ConstructionError::invalid(
            mode,
            format!("exponent must be finite, got {exponent}"),
        ));
    }
    if exponent == 1.0 {
        return Err(ConstructionError::invalid(mode, "exponent cannot be 1.0"));
    }
    Ok(())
}

pub(crate) fn build_uniform(
    _factory: &GeneratorFactory,
    spec: &ParamSpec,
) -> Result<Box<dyn Generator>, ConstructionError> {
    let min = *require(&spec.min, UNIFORM, "min")?;
    let max = *require(&spec.max, UNIFORM, "max")?;
    Ok(Box::new(UniformGenerator::new(min, max)?))
}

pub(crate) fn build_power_law(
    _factory: &GeneratorFactory,
    spec: &ParamSpec,
) -> Result<Box<dyn Generator>, ConstructionError> {
    let min = *require(&spec.min, POWER_LAW, "min")?;
    let max = *require(&spec.max, POWER_LAW, "max")?;
    let exponent = *require(&spec.exponent, POWER_LAW, "exponent")?;
    Ok(Box::new(PowerLawGenerator::new(min, max, exponent)?))
}

pub(crate) fn build_partitioned_power_law(
    _factory: &GeneratorFactory,
    spec: &ParamSpec,
) -> Result<Box<dyn Generator>, ConstructionError> {
    let min = *require(&spec.min, PARTITION_POWER_LAW, "min")?;
    let max = *require(&spec.max, PARTITION_POWER_LAW, "max")?;
    let exponent = *require(&spec.exponent, PARTITION_POWER_LAW, "exponent")?;
    let partition = *require(&spec.partition, PARTITION_POWER_LAW, "partition")?;
    Ok(Box::new(PartitionedPowerLawGenerator::new(
        min, max, partition, exponent,
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_uniform_in_range() {
        let mut rng = WorkloadRng::seed_from_u64(42);
        let generator = UniformGenerator::new(10, 20).unwrap();

        for _ in 0..1000 {
            let value = generator.sample(&mut rng);
            assert!((10..=20).contains(&value));
        }
    }

    #[test]
    fn test_uniform_constant_when_min_equals_max() {
        let mut rng = WorkloadRng::seed_from_u64(42);
        let generator = UniformGenerator::new(5, 5).unwrap();

        for _ in 0..100 {
            assert_eq!(generator.generate(&mut rng), GeneratedValue::Int(5));
        }
    }

    #[test]
    fn test_uniform_full_range() {
        let mut rng = WorkloadRng::seed_from_u64(7);
        let generator = UniformGenerator::new(i64::MIN, i64::MAX).unwrap();
        generator.sample(&mut rng);
    }

    #[test]
    fn test_uniform_rejects_inverted_range() {
        let err = UniformGenerator::new(10, 1).unwrap_err();
        assert!(err.to_string().contains("min (10) cannot be greater than max (1)"));
    }

    #[test]
    fn test_power_law_in_range() {
        let mut rng = WorkloadRng::seed_from_u64(42);
        for (min, max, exponent) in [(1, 1000, 2.5), (1, 1000, 0.5), (50, 60, 1.5), (7, 7, 3.0)] {
            let generator = PowerLawGenerator::new(min, max, exponent).unwrap();
            for _ in 0..1000 {
                let value = generator.sample(&mut rng);
                assert!(
                    (min..=max).contains(&value),
                    "{value} outside [{min}, {max}] for exponent {exponent}"
                );
            }
        }
    }

    #[test]
    fn test_power_law_skews_towards_min() {
        let mut rng = WorkloadRng::seed_from_u64(42);
        let generator = PowerLawGenerator::new(1, 1000, 2.0).unwrap();

        let mut near_min = 0;
        let mut near_max = 0;
        for _ in 0..10_000 {
            let value = generator.sample(&mut rng);
            if value <= 100 {
                near_min += 1;
            } else if value > 900 {
                near_max += 1;
            }
        }

        assert!(
            near_min > near_max * 10,
            "near_min={near_min}, near_max={near_max}"
        );
    }

    #[test]
    fn test_power_law_validation() {
        assert!(PowerLawGenerator::new(0, 10, 2.0).is_err());
        assert!(PowerLawGenerator::new(-5, 10, 2.0).is_err());
        assert!(PowerLawGenerator::new(10, 5, 2.0).is_err());
        assert!(PowerLawGenerator::new(1, 10, 1.0).is_err());
        assert!(PowerLawGenerator::new(1, 10, f64::NAN).is_err());
    }

    #[test]
    fn test_partitioned_bucket_bounds() {
        let generator = PartitionedPowerLawGenerator::new(1, 103, 4, 2.0).unwrap();

        assert_eq!(generator.bucket_bounds(0), (1, 25));
        assert_eq!(generator.bucket_bounds(1), (26, 50));
        assert_eq!(generator.bucket_bounds(2), (51, 75));
        // The final bucket absorbs the remainder.
        assert_eq!(generator.bucket_bounds(3), (76, 103));
    }

    #[test]
    fn test_partitioned_more_buckets_than_values() {
        let generator = PartitionedPowerLawGenerator::new(1, 3, 5, 2.0).unwrap();

        assert_eq!(generator.bucket_bounds(0), (1, 1));
        assert_eq!(generator.bucket_bounds(2), (3, 3));
        assert_eq!(generator.bucket_bounds(3), (3, 3));
        assert_eq!(generator.bucket_bounds(4), (3, 3));
    }

    #[test]
    fn test_partitioned_reaches_every_bucket() {
        let mut rng = WorkloadRng::seed_from_u64(42);
        let generator = PartitionedPowerLawGenerator::new(1, 100, 4, 2.0).unwrap();

        let mut hits = [0u32; 4];
        for _ in 0..2000 {
            let value = generator.sample(&mut rng);
            assert!((1..=100).contains(&value));
            let bucket = (0..generator.partition())
                .find(|&b| {
                    let (lo, hi) = generator.bucket_bounds(b);
                    (lo..=hi).contains(&value)
                })
                .unwrap();
            hits[bucket as usize] += 1;
        }

        assert!(hits.iter().all(|&h| h > 0), "bucket hits: {hits:?}");
    }

    #[test]
    fn test_partitioned_falls_back_to_uniform_below_one() {
        let mut rng = WorkloadRng::seed_from_u64(42);
        let generator = PartitionedPowerLawGenerator::new(-10, 10, 2, 2.0).unwrap();

        let mut seen_negative = false;
        for _ in 0..1000 {
            let value = generator.sample(&mut rng);
            assert!((-10..=10).contains(&value));
            seen_negative |= value < 0;
        }
        assert!(seen_negative);
    }

    #[test]
    fn test_partitioned_validation() {
        assert!(PartitionedPowerLawGenerator::new(1, 100, 0, 2.0).is_err());
        assert!(PartitionedPowerLawGenerator::new(100, 1, 4, 2.0).is_err());
        assert!(PartitionedPowerLawGenerator::new(1, 100, 4, 1.0).is_err());
    }

    #[test]
    fn test_build_reports_missing_field() {
        let spec = ParamSpec::from_yaml("type: number\nrandom_mode: power_law\nmin: 1\nmax: 10\n")
            .unwrap();
        let err = GeneratorFactory::default().build(&spec).unwrap_err();
        assert_eq!(err.to_string(), "number/power_law requires 'exponent'");
    }
}
