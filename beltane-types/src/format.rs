/// The render format imposed by the host. A change to either field forces a
/// full re-initialization of the script context and the DSP runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderFormat {
    pub sample_rate: f64,
    pub block_size: u32,
}

impl RenderFormat {
    pub fn new(sample_rate: f64, block_size: u32) -> Self {
        Self {
            sample_rate,
            block_size,
        }
    }
}
