use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use stabforge::api::{SimulationResult, SweepResult};
use stabforge::code::StabilizerCode;
use stabforge::optimizer::OptimizationResult;

/// X part and Z part side by side, one generator per row.
pub fn print_code_grid(name: &str, code: &StabilizerCode) {
    println!("\nCode: {} {}", name, code);
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);

    let mut header = vec![Cell::new("#").add_attribute(Attribute::Bold)];
    header.extend((0..code.n).map(|q| Cell::new(format!("x{}", q)).fg(Color::Cyan)));
    header.push(Cell::new("|"));
    header.extend((0..code.n).map(|q| Cell::new(format!("z{}", q)).fg(Color::Green)));
    header.push(Cell::new("Pauli").add_attribute(Attribute::Bold));
    header.push(Cell::new("Weight").add_attribute(Attribute::Bold));
    table.set_header(header);

    let weights = code.generator_weights();
    for (i, pauli) in code.pauli_strings().iter().enumerate() {
        let mut cells = vec![Cell::new(i)];
        cells.extend(
            code.x_part
                .row(i)
                .iter()
                .map(|b| Cell::new(b).set_alignment(CellAlignment::Center)),
        );
        cells.push(Cell::new("|"));
        cells.extend(
            code.z_part
                .row(i)
                .iter()
                .map(|b| Cell::new(b).set_alignment(CellAlignment::Center)),
        );
        cells.push(Cell::new(pauli));
        cells.push(Cell::new(weights[i]).set_alignment(CellAlignment::Right));
        table.add_row(cells);
    }

    let mut usage = vec![Cell::new("use").add_attribute(Attribute::Bold)];
    usage.extend(
        code.qubit_usage()
            .iter()
            .map(|u| Cell::new(u).set_alignment(CellAlignment::Center)),
    );
    table.add_row(usage);
    println!("{}", table);
}

pub fn print_summary(result: &OptimizationResult) {
    let gates = result.best_code.gate_counts();
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let rows: Vec<(&str, String)> = vec![
        (
            "Parameters",
            format!("n={}, k={}, d={}", result.n, result.k, result.d),
        ),
        ("Noise Model", result.model.to_string()),
        ("Physical Error Rate", format!("{}", result.physical_error_rate)),
        ("Initial Error Rate", format!("{:.6}", result.initial_error_rate)),
        ("Final Error Rate", format!("{:.6}", result.final_error_rate)),
        ("Improvement", format!("{:.2}%", result.improvement_percent)),
        ("Iterations", result.iterations().to_string()),
        ("Termination", result.termination.to_string()),
        ("Restart", result.restart.to_string()),
        (
            "Extraction Gates",
            format!(
                "{} (CX {}, CZ {}, CY {})",
                gates.total(),
                gates.cx,
                gates.cz,
                gates.cy
            ),
        ),
    ];

    for (label, value) in rows {
        table.add_row(vec![
            Cell::new(label).add_attribute(Attribute::Bold),
            Cell::new(value).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("\n{}", table);
}

/// Trace table; long traces are thinned to roughly `max_rows` lines (last row always shown).
pub fn print_trace(result: &OptimizationResult, max_rows: usize) {
    let points = result.trace.points();
    if points.is_empty() {
        return;
    }
    let stride = points.len().div_ceil(max_rows.max(1)).max(1);
    let best = result.trace.best_so_far();

    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.set_header(vec![
        Cell::new("Iteration").add_attribute(Attribute::Bold),
        Cell::new("Error Rate").fg(Color::Cyan),
        Cell::new("Best So Far").fg(Color::Green),
    ]);

    for (i, p) in points.iter().enumerate() {
        if i % stride != 0 && i + 1 != points.len() {
            continue;
        }
        table.add_row(vec![
            Cell::new(p.iteration).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.6}", p.error_rate)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.6}", best[i])).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("\n{}", table);
}

pub fn print_simulation(sim: &SimulationResult) {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.set_header(vec![
        Cell::new("Distance").add_attribute(Attribute::Bold),
        Cell::new(format!("{} @ p={}", sim.model, sim.error_rate)).fg(Color::Cyan),
    ]);

    for r in &sim.per_distance {
        let mut rate = Cell::new(format!("{:.6e}", r.logical_error_rate))
            .set_alignment(CellAlignment::Right);
        if r.distance == sim.optimal_distance {
            rate = rate.fg(Color::Green).add_attribute(Attribute::Bold);
        }
        table.add_row(vec![
            Cell::new(r.distance).set_alignment(CellAlignment::Right),
            rate,
        ]);
    }
    println!("\n{}", table);
    println!("Optimal Code Distance: {}", sim.optimal_distance);
    println!("Minimal Logical Error Rate: {:.6}", sim.minimal_error_rate);
}

pub fn print_sweep(sweep: &SweepResult) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![Cell::new("Distance").add_attribute(Attribute::Bold)];
    header.extend(sweep.models.iter().map(|m| Cell::new(m.model).fg(Color::Cyan)));
    table.set_header(header);

    let rows = sweep.models.first().map_or(0, |m| m.per_distance.len());
    for i in 0..rows {
        let distance = sweep.models[0].per_distance[i].distance;
        let mut cells = vec![Cell::new(distance).set_alignment(CellAlignment::Right)];
        for m in &sweep.models {
            let rate = m.per_distance[i].logical_error_rate;
            let mut cell = Cell::new(format!("{:.6e}", rate)).set_alignment(CellAlignment::Right);
            if m.model == sweep.best_model && distance == sweep.best_distance {
                cell = cell.fg(Color::Green).add_attribute(Attribute::Bold);
            }
            cells.push(cell);
        }
        table.add_row(cells);
    }
    println!("\n{}", table);
    println!(
        "Best: {} at distance {} ({:.6e})",
        sweep.best_model, sweep.best_distance, sweep.best_error_rate
    );
}
