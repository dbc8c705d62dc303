//! Exclusive render-mode selection for image filter programs.
//!
//! A filter program exposes a uniform block with three members:
//!
//! ```wgsl
//! struct FilterParams {
//!     mode: u32,
//!     kernel_weight: f32,
//!     kernel: array<vec4<f32>, 3>, // rows of three coefficients, w unused
//! }
//! ```
//!
//! [`RenderMode::write_uniforms`] fills it; the fragment shader dispatches on
//! `mode` once per fragment.

use crate::error::{EngineError, EngineResult};
use crate::program::UniformBlock;

/// Uniform member names the filter program must declare.
pub const MODE_UNIFORM: &str = "mode";
pub const KERNEL_WEIGHT_UNIFORM: &str = "kernel_weight";
pub const KERNEL_UNIFORM: &str = "kernel";

/// Edge enhancement kernel; sums to 2.
pub const EDGE_ENHANCEMENT: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 10.0, -1.0, -1.0, -1.0, -1.0];

/// How the sampled image colour is transformed before output.
///
/// Exactly one mode is active at a time.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub enum RenderMode {
    #[default]
    Identity,
    /// Luminance `0.59r + 0.30g + 0.11b`.
    Grayscale,
    /// `1 - rgb`.
    Inverse,
    /// 3x3 convolution; the result is divided by `weight`.
    Kernel { coefficients: [f32; 9], weight: f32 },
    /// Looks up the palette texture at `(1 - r, 0)`.
    PaletteLookup,
}

impl RenderMode {
    /// Kernel mode weighted by the sum of its coefficients.
    ///
    /// A zero-sum kernel yields a mode that fails [`validate`](Self::validate).
    pub fn kernel(coefficients: [f32; 9]) -> Self {
        let weight = coefficients.iter().sum();
        RenderMode::Kernel {
            coefficients,
            weight,
        }
    }

    /// Shader-side selector value.
    pub fn selector(&self) -> u32 {
        match self {
            RenderMode::Identity => 0,
            RenderMode::Grayscale => 1,
            RenderMode::Inverse => 2,
            RenderMode::Kernel { .. } => 3,
            RenderMode::PaletteLookup => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RenderMode::Identity => "identity",
            RenderMode::Grayscale => "grayscale",
            RenderMode::Inverse => "inverse",
            RenderMode::Kernel { .. } => "kernel",
            RenderMode::PaletteLookup => "palette",
        }
    }

    /// Rejects kernels whose weight would divide by zero (or by NaN/inf).
    pub fn validate(&self) -> EngineResult<()> {
        match *self {
            RenderMode::Kernel {
                coefficients,
                weight,
            } => {
                if weight == 0.0 || !weight.is_finite() {
                    return Err(EngineError::InvalidKernelWeight(weight));
                }
                if coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(EngineError::InvalidKernelWeight(weight));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Writes selector, weight and kernel rows into `block`.
    ///
    /// Non-kernel modes write an all-zero kernel with weight 1, so no member
    /// carries state from a previously selected mode.
    pub fn write_uniforms(&self, block: &mut UniformBlock) -> EngineResult<()> {
        self.validate()?;

        let (coefficients, weight) = match *self {
            RenderMode::Kernel {
                coefficients,
                weight,
            } => (coefficients, weight),
            _ => ([0.0; 9], 1.0),
        };

        block.set_u32(MODE_UNIFORM, self.selector())?;
        block.set_f32(KERNEL_WEIGHT_UNIFORM, weight)?;
        block.set_f32s(KERNEL_UNIFORM, &pack_kernel_rows(&coefficients))?;
        Ok(())
    }
}

/// Packs nine coefficients into three `vec4` rows (uniform arrays use a 16-byte stride).
pub fn pack_kernel_rows(coefficients: &[f32; 9]) -> [f32; 12] {
    let mut rows = [0.0; 12];
    for (i, c) in coefficients.iter().enumerate() {
        rows[(i / 3) * 4 + i % 3] = *c;
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{UniformField, UniformLayout};

    fn filter_block() -> UniformBlock {
        UniformBlock::new(
            "filters",
            &UniformLayout {
                name: "params".into(),
                group: 0,
                binding: 0,
                size: 64,
                fields: vec![
                    UniformField::new("mode", 0, 4),
                    UniformField::new("kernel_weight", 4, 4),
                    UniformField::new("kernel", 16, 48),
                ],
            },
        )
    }

    fn read_f32(bytes: &[u8], offset: usize) -> f32 {
        f32::from_ne_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn read_u32(bytes: &[u8], offset: usize) -> u32 {
        u32::from_ne_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    // ── validation ────────────────────────────────────────────────────────

    #[test]
    fn zero_weight_kernel_is_rejected() {
        let mode = RenderMode::kernel([1.0, -1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(matches!(
            mode.validate(),
            Err(EngineError::InvalidKernelWeight(w)) if w == 0.0
        ));
    }

    #[test]
    fn non_finite_weight_is_rejected() {
        let mode = RenderMode::Kernel {
            coefficients: [0.0; 9],
            weight: f32::NAN,
        };
        assert!(mode.validate().is_err());

        let mode = RenderMode::Kernel {
            coefficients: [0.0; 9],
            weight: f32::INFINITY,
        };
        assert!(mode.validate().is_err());
    }

    #[test]
    fn edge_enhancement_sums_to_two() {
        let mode = RenderMode::kernel(EDGE_ENHANCEMENT);
        assert_eq!(
            mode,
            RenderMode::Kernel {
                coefficients: EDGE_ENHANCEMENT,
                weight: 2.0
            }
        );
        assert!(mode.validate().is_ok());
    }

    #[test]
    fn non_kernel_modes_always_validate() {
        for m in [
            RenderMode::Identity,
            RenderMode::Grayscale,
            RenderMode::Inverse,
            RenderMode::PaletteLookup,
        ] {
            assert!(m.validate().is_ok(), "{}", m.name());
        }
    }

    #[test]
    fn selectors_are_distinct() {
        let sel = [
            RenderMode::Identity.selector(),
            RenderMode::Grayscale.selector(),
            RenderMode::Inverse.selector(),
            RenderMode::kernel(EDGE_ENHANCEMENT).selector(),
            RenderMode::PaletteLookup.selector(),
        ];
        for i in 0..sel.len() {
            for j in i + 1..sel.len() {
                assert_ne!(sel[i], sel[j]);
            }
        }
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    #[test]
    fn kernel_rows_are_padded_to_vec4() {
        let rows = pack_kernel_rows(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(
            rows,
            [1.0, 2.0, 3.0, 0.0, 4.0, 5.0, 6.0, 0.0, 7.0, 8.0, 9.0, 0.0]
        );
    }

    #[test]
    fn kernel_mode_writes_all_members() {
        let mut block = filter_block();
        RenderMode::kernel(EDGE_ENHANCEMENT)
            .write_uniforms(&mut block)
            .unwrap();

        let bytes = block.bytes();
        assert_eq!(read_u32(bytes, 0), 3);
        assert_eq!(read_f32(bytes, 4), 2.0);
        assert_eq!(read_f32(bytes, 16), -1.0);
        assert_eq!(read_f32(bytes, 16 + 4 * 4 + 4), 10.0);
        assert_eq!(read_f32(bytes, 16 + 3 * 4), 0.0);
    }

    #[test]
    fn switching_mode_clears_previous_kernel() {
        let mut block = filter_block();
        RenderMode::kernel(EDGE_ENHANCEMENT)
            .write_uniforms(&mut block)
            .unwrap();
        RenderMode::Grayscale.write_uniforms(&mut block).unwrap();

        let bytes = block.bytes();
        assert_eq!(read_u32(bytes, 0), 1);
        assert_eq!(read_f32(bytes, 4), 1.0);
        assert!((16..64).step_by(4).all(|o| read_f32(bytes, o) == 0.0));
    }

    #[test]
    fn invalid_kernel_leaves_block_untouched() {
        let mut block = filter_block();
        RenderMode::Inverse.write_uniforms(&mut block).unwrap();
        let before = block.bytes().to_vec();

        let err = RenderMode::kernel([0.0; 9]).write_uniforms(&mut block);
        assert!(matches!(err, Err(EngineError::InvalidKernelWeight(_))));
        assert_eq!(block.bytes(), &before[..]);
    }

    #[test]
    fn missing_member_fails_loudly() {
        let mut block = UniformBlock::new(
            "plain",
            &UniformLayout {
                name: "color".into(),
                group: 0,
                binding: 0,
                size: 16,
                fields: vec![UniformField::new("color", 0, 16)],
            },
        );
        let err = RenderMode::Grayscale.write_uniforms(&mut block);
        assert!(matches!(err, Err(EngineError::UnknownUniform { .. })));
    }
}
