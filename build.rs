//! Generates pseudo-random Zobrist keys used for hashing positions in the
//! transposition table. The keys are written to `OUT_DIR` and included from
//! `src/chess/zobrist.rs`; they are not stable between builds.

use std::env;
use std::path::Path;

fn generate_file(filename: &str, contents: &str) {
    let out_dir = env::var_os("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join(filename);
    std::fs::write(dest_path, contents).unwrap();
}

fn generate_zobrist_keys() {
    let mut rng = rand::thread_rng();

    // One key per (player, piece kind, square) triple.
    let piece_keys: [u64; 768] = std::array::from_fn(|_| rand::Rng::r#gen(&mut rng));
    generate_file("pieces_zobrist_keys", &format!("{piece_keys:?}"));

    // En passant is hashed by target file.
    let en_passant_keys: [u64; 8] = std::array::from_fn(|_| rand::Rng::r#gen(&mut rng));
    generate_file("en_passant_zobrist_keys", &format!("{en_passant_keys:?}"));
}

fn main() {
    generate_zobrist_keys();
}
