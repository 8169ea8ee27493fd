use rand::SeedableRng;
use rand_pcg::Pcg64;

/// Golden-ratio multiplier that spreads category indices across the seed
/// space.
const CATEGORY_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Salt separating a category's sampling stream from its count stream.
const SAMPLE_SALT: u64 = 0x517C_C1B7_2722_0A95;

/// Independent RNG streams for one category's placement pass.
///
/// The count stream resolves the target instance count; the sample stream
/// drives candidate positions and yaw. Keeping them separate means the
/// number of rejected candidates can never shift the count draw, and no
/// two categories ever share a sequence.
pub struct CategoryStreams {
    pub count: Pcg64,
    pub sample: Pcg64,
}

impl CategoryStreams {
    pub fn derive(run_seed: u64, category_index: u32) -> Self {
        let count_seed = run_seed ^ (category_index as u64).wrapping_mul(CATEGORY_MIX);
        let sample_seed = count_seed ^ SAMPLE_SALT;
        Self {
            count: Pcg64::seed_from_u64(count_seed),
            sample: Pcg64::seed_from_u64(sample_seed),
        }
    }
}
