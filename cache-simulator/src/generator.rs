//! Workload script generation
//!
//! Produces pseudo-random operation scripts with a hot/cold key skew: a
//! configurable share of traffic goes to a small set of popular keys, the
//! rest is spread over the whole key space. Scripts are reproducible when a
//! seed is given.

use crate::models::{Key, Op, Value};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Configuration for script generation
#[derive(Debug, Clone)]
pub struct ScriptConfig {
    /// Number of operations to generate
    pub ops: usize,
    /// Number of distinct keys
    pub keys: Key,
    /// Percentage of keys that are popular
    pub hot_keys_percent: u8,
    /// Percentage of traffic that targets popular keys
    pub hot_traffic_percent: u8,
    /// Percentage of operations that are puts
    pub put_percent: u8,
    /// Percentage of operations that are removes
    pub remove_percent: u8,
    /// Seed for reproducible scripts; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            ops: 100_000,
            keys: 10_000,
            hot_keys_percent: 20,
            hot_traffic_percent: 80,
            put_percent: 30,
            remove_percent: 5,
            seed: None,
        }
    }
}

/// Generates operation scripts
pub struct ScriptGenerator {
    config: ScriptConfig,
}

impl ScriptGenerator {
    /// Percentages are clamped to 100, and removes to what puts leave over
    pub fn new(mut config: ScriptConfig) -> Self {
        config.hot_keys_percent = config.hot_keys_percent.min(100);
        config.hot_traffic_percent = config.hot_traffic_percent.min(100);
        config.put_percent = config.put_percent.min(100);
        config.remove_percent = config.remove_percent.min(100 - config.put_percent);
        Self { config }
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Generate the whole script in memory
    pub fn generate(&self) -> Vec<Op> {
        let mut rng = self.rng();
        (0..self.config.ops)
            .map(|step| self.next_op(&mut rng, step))
            .collect()
    }

    /// Stream the script to a writer, with a header line
    pub fn write_to<W: Write>(&self, out: W) -> io::Result<usize> {
        let mut out = BufWriter::new(out);
        let mut rng = self.rng();
        writeln!(out, "op,key,value")?;
        for step in 0..self.config.ops {
            writeln!(out, "{}", self.next_op(&mut rng, step))?;
        }
        out.flush()?;
        Ok(self.config.ops)
    }

    /// Write the script to a file
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> io::Result<usize> {
        let path = path.as_ref();
        let written = self.write_to(File::create(path)?)?;
        info!(
            ops = written,
            keys = self.config.keys,
            path = %path.display(),
            "generated workload script"
        );
        Ok(written)
    }

    fn next_key(&self, rng: &mut StdRng) -> Key {
        let keys = self.config.keys.max(1);
        let hot_keys =
            ((u64::from(keys) * u64::from(self.config.hot_keys_percent) / 100) as Key).max(1);
        if rng.gen_range(0..100) < self.config.hot_traffic_percent {
            rng.gen_range(0..hot_keys)
        } else {
            rng.gen_range(0..keys)
        }
    }

    fn next_op(&self, rng: &mut StdRng, step: usize) -> Op {
        let key = self.next_key(rng);
        let roll = rng.gen_range(0..100u8);
        if roll < self.config.put_percent {
            Op::Put {
                key,
                value: step as Value,
            }
        } else if roll < self.config.put_percent + self.config.remove_percent {
            Op::Remove { key }
        } else {
            Op::Get { key }
        }
    }
}
