//! Flexure Solver Example - point load on a uniform plate
//!
//! Without arguments, solves a single loaded cell with FD and SPA and
//! compares the profiles. With a path argument, runs the JSON parameter file.

use anyhow::Context;
use nalgebra::DMatrix;

use flexure_solver::prelude::*;

fn run_config(path: &str) -> anyhow::Result<()> {
    let config = FlexureConfig::from_file(path)
        .with_context(|| format!("failed to read parameter file {}", path))?;
    let mut model = config.into_model()?;

    println!("=== Flexure: {} ===\n", path);
    println!(
        "Method {} on a {} x {} grid, dx = {} m",
        model.method, model.grid.ny, model.grid.nx, model.grid.dx
    );
    model.run()?;
    print_summary(&model.summary()?);
    Ok(())
}

fn print_summary(summary: &FlexureSummary) {
    println!("\nSummary ({}):", summary.method);
    println!(
        "  Min deflection: {:.4} m at {:?}",
        summary.min_deflection, summary.min_cell
    );
    println!(
        "  Max deflection: {:.4} m at {:?}",
        summary.max_deflection, summary.max_cell
    );
    println!("  Mean deflection: {:.4} m", summary.mean_deflection);
}

fn run_demo() -> anyhow::Result<()> {
    println!("=== Flexure Solver Example: Point Load ===\n");

    // 61 x 61 cells at 5 km, one loaded cell in the middle
    let n = 61;
    let dx = 5000.0;
    let centre = n / 2;
    let mut q0 = DMatrix::zeros(n, n);
    q0[(centre, centre)] = 3300.0 * 9.8 * 1000.0;

    // Te = 15 km over mantle (3300 kg/m³) gives alpha of about 6 cells
    let params = ElasticParameters::uniform(15_000.0, 3300.0);

    let mut fd = FlexureModel::new(dx, dx, params.clone(), q0.clone(), Method::Fd)?;
    fd.run()?;
    let mut spa = FlexureModel::new(dx, dx, params, q0, Method::Spa)?;
    spa.run()?;

    let w_fd = fd.deflection()?;
    let w_spa = spa.deflection()?;

    println!("Profile along the loaded row:");
    println!("  {:>8}  {:>12}  {:>12}", "x (km)", "FD (m)", "SPA (m)");
    for i in (centre..n).step_by(3) {
        println!(
            "  {:>8.0}  {:>12.5}  {:>12.5}",
            (i - centre) as f64 * dx / 1000.0,
            w_fd[(centre, i)],
            w_spa[(centre, i)]
        );
    }

    let rel = (w_fd[(centre, centre)] - w_spa[(centre, centre)]).abs()
        / w_spa[(centre, centre)].abs();
    println!("\nCentre difference FD vs SPA: {:.2}%", rel * 100.0);

    print_summary(&fd.summary()?);
    print_summary(&spa.summary()?);

    // A second load on the same operator
    let mut q1 = DMatrix::zeros(n, n);
    q1[(centre, centre - 10)] = 3300.0 * 9.8 * 1000.0;
    fd.rerun(q1)?;
    println!(
        "\nRerun with the load shifted 50 km west: centre deflection {:.5} m",
        fd.deflection()?[(centre, centre)]
    );

    println!("\n=== Analysis Complete ===");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    match std::env::args().nth(1) {
        Some(path) => run_config(&path),
        None => run_demo(),
    }
}
