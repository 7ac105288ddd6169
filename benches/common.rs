use rust_scan::{Candidate, Symbology};

/// Deterministic noisy frame stream: each frame shows a few of `codes`
/// distinct values, with every tenth frame empty.
pub fn synthetic_frames(frames: usize, codes: usize, per_frame: usize) -> Vec<Vec<Candidate>> {
    let pool: Vec<Candidate> = (0..codes)
        .map(|i| Candidate::new(format!("{:013}", 4_006_381_000_000u64 + i as u64), Symbology::Ean13))
        .collect();
    let mut state = 0x2545_f491_4f6c_dd1du64;
    (0..frames)
        .map(|f| {
            if f % 10 == 9 {
                return Vec::new();
            }
            (0..per_frame)
                .map(|_| {
                    state ^= state << 13;
                    state ^= state >> 7;
                    state ^= state << 17;
                    pool[(state % codes as u64) as usize].clone()
                })
                .collect()
        })
        .collect()
}
