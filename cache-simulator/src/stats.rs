// Statistics reporting for cache simulation

use crate::models::{CsvResultRow, SimulationResult};
use std::path::Path;

/// Collects and reports results from one or more simulation runs
#[derive(Debug, Default)]
pub struct SimulationStats {
    results: Vec<SimulationResult>,
}

impl SimulationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the result of one run
    pub fn record(&mut self, result: SimulationResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[SimulationResult] {
        &self.results
    }

    /// Total divergences from the reference cache across all runs
    pub fn divergences(&self) -> usize {
        self.results.iter().map(|r| r.divergences).sum()
    }

    /// Print a summary report of the simulation results
    pub fn print_summary(&self) {
        println!("\nCache Simulation Summary");
        println!("========================");
        println!(
            "{:>8} {:>8} {:>6} {:>10} {:>8} {:>10} {:>6} {:>9} {:>9} {:>8} {:>8} {:>8}",
            "Capacity",
            "Table",
            "Load",
            "Ops",
            "HitRate",
            "Evictions",
            "Diverg",
            "AvgProbe",
            "MaxProbe",
            "GetAvg",
            "PutAvg",
            "p99"
        );
        println!("{}", "-".repeat(110));

        for result in &self.results {
            let load = if result.table_size > 0 {
                result.capacity as f64 / result.table_size as f64
            } else {
                0.0
            };
            println!(
                "{:>8} {:>8} {:>6.2} {:>10} {:>7.2}% {:>10} {:>6} {:>9.3} {:>9} {:>6.0}ns {:>6.0}ns {:>6}ns",
                result.capacity,
                result.table_size,
                load,
                result.total_ops,
                result.hit_rate(),
                result.evictions,
                result.divergences,
                result.avg_probe_distance,
                result.max_probe_distance,
                result.latency.get_stats.avg_ns(),
                result.latency.put_stats.avg_ns(),
                result.latency.get_stats.percentiles.p99_ns
            );
        }
    }

    /// Export results to a CSV file
    pub fn export_csv(&self, path: &Path) -> Result<(), std::io::Error> {
        let mut writer = csv::Writer::from_path(path)?;
        for result in &self.results {
            writer.serialize(CsvResultRow::from(result))?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divergences_sum_over_runs() {
        let mut stats = SimulationStats::new();
        stats.record(SimulationResult {
            divergences: 2,
            ..Default::default()
        });
        stats.record(SimulationResult::default());
        assert_eq!(stats.results().len(), 2);
        assert_eq!(stats.divergences(), 2);
    }

    #[test]
    fn test_export_csv() {
        let mut stats = SimulationStats::new();
        stats.record(SimulationResult {
            capacity: 4,
            table_size: 8,
            hits: 1,
            misses: 1,
            ..Default::default()
        });
        let path = std::env::temp_dir().join(format!(
            "probe_lru_sim_stats_{}.csv",
            std::process::id()
        ));
        stats.export_csv(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("capacity,table_size,total_ops,hits,misses,hit_rate"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("4,8,0,1,1,50"));
        assert!(lines.next().is_none());
    }
}
