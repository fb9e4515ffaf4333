//! Modal Solver Example - Portal Frame and Cantilever Check

use anyhow::Context;
use modal_solver::prelude::*;

fn portal_frame() -> SolverResult<FrameModel> {
    let mut model = FrameModel::new();

    model.add_material("Steel", Material::steel())?;

    // W12x26 (approximate properties)
    // A = 7.65 in² = 0.00494 m²
    // Iy = 204 in⁴ = 8.49e-5 m⁴
    // Iz = 17.3 in⁴ = 7.2e-6 m⁴
    // J = 0.3 in⁴ = 1.25e-7 m⁴
    model.add_section("W12x26", Section::new(0.00494, 8.49e-5, 7.2e-6, 1.25e-7))?;

    //     N3 -------- N4
    //     |          |
    //     |          |
    //     N1        N2
    //   Fixed     Fixed
    let height = 4.0;
    let span = 6.0;

    model.add_node("N1", Node::new(0.0, 0.0, 0.0).with_restraints(Restraints::fixed()))?;
    model.add_node("N2", Node::new(span, 0.0, 0.0).with_restraints(Restraints::fixed()))?;
    model.add_node("N3", Node::new(0.0, 0.0, height))?;
    model.add_node("N4", Node::new(span, 0.0, height))?;

    model.add_element("Col1", FrameElement::column("N1", "N3", "Steel", "W12x26"))?;
    model.add_element("Col2", FrameElement::column("N2", "N4", "Steel", "W12x26"))?;
    model.add_element("Beam", FrameElement::new("N3", "N4", "Steel", "W12x26"))?;

    // Roof slab share, 2 t per corner
    model.set_nodal_mass("N3", NodalMass::translational(2000.0))?;
    model.set_nodal_mass("N4", NodalMass::translational(2000.0))?;

    Ok(model)
}

/// Massless cantilever with a tip mass: f = √(3EI/(mL³)) / 2π
fn cantilever_check() -> anyhow::Result<()> {
    let (length, e, i, mass): (f64, f64, f64, f64) = (3.0, 200e9, 8.33e-6, 1000.0);

    let mut model = FrameModel::new();
    model.add_material("Massless", Material::new(e, 77e9, 0.0))?;
    model.add_section("S", Section::new(0.01, i, i, 2.0 * i))?;
    model.add_node("Base", Node::new(0.0, 0.0, 0.0).with_restraints(Restraints::fixed()))?;
    model.add_node(
        "Tip",
        Node::new(0.0, 0.0, length).with_mass(NodalMass::translational(mass)),
    )?;
    model.add_element("C1", FrameElement::column("Base", "Tip", "Massless", "S"))?;

    let result = model
        .analyze_modal(&ModalOptions::modes(1))
        .context("cantilever analysis failed")?;
    let computed = result.modes[0].frequency;
    let expected = (3.0 * e * i / (mass * length.powi(3))).sqrt() / (2.0 * std::f64::consts::PI);

    println!("=== Cantilever Check ===\n");
    println!("  Closed form: {:.4} Hz", expected);
    println!("  Computed:    {:.4} Hz", computed);
    println!("  Error:       {:.3}%", (computed - expected).abs() / expected * 100.0);
    println!();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("=== Modal Solver Example: Portal Frame ===\n");

    let model = portal_frame()?;
    let options = ModalOptions::modes(6).with_max_iter(500);

    println!("Running modal analysis...\n");
    let result = model.analyze_modal(&options).context("modal analysis failed")?;

    println!("Mode   f (Hz)     T (s)      UX %    UY %    UZ %    ΣUX %   ΣUY %");
    for mode in &result.modes {
        println!(
            "{:>4} {:>9.3} {:>9.4} {:>7.2} {:>7.2} {:>7.2} {:>7.2} {:>7.2}",
            mode.mode,
            mode.frequency,
            mode.period.unwrap_or(0.0),
            mode.participation.ux,
            mode.participation.uy,
            mode.participation.uz,
            mode.cumulative.ux,
            mode.cumulative.uy,
        );
    }

    println!("\nMode 1 shape:");
    for shape in result.mode_shape(1) {
        let d = &shape.displacement;
        println!(
            "  {}: DX={:+.4}, DY={:+.4}, DZ={:+.4}, |θ|={:.4}",
            shape.node,
            d.dx,
            d.dy,
            d.dz,
            d.rotation_magnitude()
        );
    }

    if !result.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &result.warnings {
            println!("  {:?}", warning);
        }
    }
    println!();

    cantilever_check()?;

    println!("=== Analysis Complete ===");
    Ok(())
}
