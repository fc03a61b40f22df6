use superpixel_lgc::image::{FeatureField, Partition};

pub const SENTINEL: u32 = 1_000;
pub const WIDTH: usize = 24;
pub const HEIGHT: usize = 16;
pub const BLOCK: usize = 4;
pub const BLOCK_COLS: usize = WIDTH / BLOCK;

/// Pixel column masked out with the sentinel.
pub const MASKED_COL: usize = WIDTH - 1;

pub fn install_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Square blocks of `BLOCK` pixels numbered row-major; the last pixel column
/// is masked.
pub fn block_partition() -> Partition {
    let mut data = Vec::with_capacity(WIDTH * HEIGHT);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let id = if x == MASKED_COL {
                SENTINEL
            } else {
                ((y / BLOCK) * BLOCK_COLS + x / BLOCK) as u32
            };
            data.push(id);
        }
    }
    Partition::from_vec(WIDTH, HEIGHT, data).expect("block partition")
}

pub fn region_count() -> usize {
    BLOCK_COLS * (HEIGHT / BLOCK)
}

/// 1-based class of a block: left half 1, right half 2.
pub fn block_class(region: usize) -> u32 {
    if region % BLOCK_COLS < BLOCK_COLS / 2 {
        1
    } else {
        2
    }
}

fn pixel_class(x: usize) -> u32 {
    if x / BLOCK < BLOCK_COLS / 2 {
        1
    } else {
        2
    }
}

/// Small deterministic per-pixel perturbation in [0, 0.04].
fn jitter(x: usize, y: usize) -> f64 {
    ((x * 7 + y * 3) % 5) as f64 * 0.01
}

/// One scalar channel: about 0 on the left half, about 5 on the right.
pub fn two_class_scalar_field() -> FeatureField {
    let mut field = FeatureField::new(WIDTH, HEIGHT, 1).expect("scalar field");
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let base = if pixel_class(x) == 1 { 0.0 } else { 5.0 };
            field.pixel_mut(x, y)[0] = base + jitter(x, y);
        }
    }
    field
}

/// Stokes vectors whose coherence matrices differ between the two halves.
pub fn two_class_stokes_field() -> FeatureField {
    let mut field = FeatureField::new(WIDTH, HEIGHT, 4).expect("stokes field");
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            // (c11, c12_real, c22, c12_imag)
            let c = if pixel_class(x) == 1 {
                [1.0 + jitter(x, y), 0.1, 0.5, 0.05]
            } else {
                [3.0 + jitter(x, y), 0.2, 2.0, 0.0]
            };
            let px = field.pixel_mut(x, y);
            px[0] = c[0] + c[2];
            px[1] = c[0] - c[2];
            px[2] = 2.0 * c[1];
            px[3] = -2.0 * c[3];
        }
    }
    field
}
