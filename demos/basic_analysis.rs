//! Basic example: unmix a sink from three sources, then lay out all sites.
//!
//! This example shows how to:
//! 1. Build category vectors in code
//! 2. Normalize them into a sample set
//! 3. Estimate source contributions with several metrics
//! 4. Run metric MDS and read the stress

use sourcemix::prelude::*;

fn main() -> Result<()> {
    println!("=== sourcemix example ===\n");

    let vectors = create_example_data()?;
    let samples = norm_tss(&vectors, &TssConfig::default())?;

    println!("Samples:    {}", samples.len());
    println!("Categories: {}", samples.categories().join(", "));
    println!();

    // Unmixing
    println!("=== Source Unmixing ===\n");
    let config = UnmixConfig::default().with_seed(42);
    for metric in [Metric::R2, Metric::Likeness, Metric::Kuiper] {
        let result = unmix_samples(
            &samples,
            "harbor",
            &["river", "road_runoff", "wastewater"],
            metric.name(),
            &config,
        )?;
        println!("{}", result);
    }

    // MDS
    println!("=== MDS ===\n");
    let layout = mds(&samples, Metric::Likeness, &MdsConfig::default())?;
    println!("{}", layout);

    Ok(())
}

/// Particle-type counts for three sources, one mixed site and two others.
fn create_example_data() -> Result<Vec<CategoryVector>> {
    let rows: [(&str, [f64; 5]); 6] = [
        ("river", [520.0, 140.0, 90.0, 50.0, 12.0]),
        ("road_runoff", [60.0, 610.0, 180.0, 40.0, 4.0]),
        ("wastewater", [110.0, 70.0, 90.0, 520.0, 30.0]),
        ("harbor", [240.0, 300.0, 130.0, 210.0, 25.0]),
        ("beach", [310.0, 220.0, 280.0, 90.0, 8.0]),
        ("offshore", [150.0, 90.0, 400.0, 60.0, 2.0]),
    ];
    let categories = ["fiber", "fragment", "film", "bead", "unknown"];

    rows.iter()
        .map(|(name, counts)| {
            CategoryVector::from_pairs(*name, categories.iter().copied().zip(counts.iter().copied()))
        })
        .collect()
}
