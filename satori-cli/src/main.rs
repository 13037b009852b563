use satori::{
    cnf::CnfFormula,
    dpll::{classic::ClassicDpll, naive::NaiveDpll, watched::WatchedDpll},
    lit::Lit,
    resolution::{naive::NaiveResolution, ordered::OrderedResolution},
    trace::{TraceBuffer, TraceStyle, Tracer},
    truth_table::TruthTable,
    verdict::{Verdict, Witness},
};

const ENGINES: &str = "table, table-leaves, resolution, resolution-ordered, \
                       dpll, dpll-classic, dpll-watched, dpll-watched-raw";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .with_level(true)
        .with_target(true)
        .with_env_filter(tracing_subscriber::EnvFilter::new(
            std::env::var("SATORI_LOG").as_deref().unwrap_or("info"),
        ))
        .init();

    let mut args = std::env::args().skip(1);
    let engine = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("usage: satori <engine> <cnf file>; engines: {ENGINES}"))?;
    let path = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("no input formula"))?;

    let trace_style = match std::env::var("SATORI_TRACE").as_deref() {
        Ok("plain") => Some(TraceStyle::Plain),
        Ok("html") => Some(TraceStyle::Html),
        Ok("console") => Some(TraceStyle::Console),
        Ok(other) => anyhow::bail!("unknown SATORI_TRACE value {other:?}"),
        Err(_) => None,
    };

    let start = std::time::Instant::now();

    let mut input = flussab_cnf::cnf::Parser::<Lit>::from_read(
        std::fs::File::open(&path)?,
        flussab_cnf::cnf::Config::default().ignore_header(true),
    )?;

    // With a header the declared variable range is enforced; without one the
    // formula grows to cover whatever the clauses mention.
    let header = input.header();
    let mut formula = match header {
        Some(header) => CnfFormula::with_var_count(header.var_count),
        None => CnfFormula::default(),
    };
    let checked = header.is_some();

    while let Some(clause) = input.next_clause()? {
        if checked {
            formula.try_add_clause(clause)?;
        } else {
            formula.add_clause(clause);
        }
    }

    tracing::info!(
        engine = %engine,
        vars = formula.var_count(),
        clauses = formula.clause_count(),
    );

    let mut buffer = TraceBuffer::default();
    let verdict = if trace_style.is_some() {
        run_engine(&engine, &formula, &mut Tracer::new(&mut buffer))?
    } else {
        run_engine(&engine, &formula, &mut Tracer::off())?
    };

    let duration = start.elapsed();
    tracing::info!(sat = verdict.is_sat(), ?duration);

    if let Some(style) = trace_style {
        print!("{}", buffer.render(style));
    }

    match verdict {
        Verdict::Sat(witness) => {
            println!("s SATISFIABLE");
            match witness {
                Witness::Total(lits) | Witness::Partial(lits) => {
                    let mut line = String::from("v");
                    for lit in lits {
                        line.push_str(&format!(" {lit}"));
                    }
                    line.push_str(" 0");
                    println!("{line}");
                }
                Witness::Bare => {}
            }
        }
        Verdict::Unsat => println!("s UNSATISFIABLE"),
    }

    Ok(())
}

fn run_engine(
    engine: &str,
    formula: &CnfFormula,
    tracer: &mut Tracer,
) -> anyhow::Result<Verdict> {
    Ok(match engine {
        "table" => TruthTable::default().solve(formula, tracer),
        "table-leaves" => TruthTable { leaves_only: true }.solve(formula, tracer),
        "resolution" => NaiveResolution.solve(formula, tracer),
        "resolution-ordered" => OrderedResolution.solve(formula, tracer),
        "dpll" => NaiveDpll.solve(formula, tracer),
        "dpll-classic" => ClassicDpll.solve(formula, tracer),
        "dpll-watched" => WatchedDpll::default().solve(formula, tracer),
        "dpll-watched-raw" => WatchedDpll { preprocess: false }.solve(formula, tracer),
        other => anyhow::bail!("unknown engine {other:?}; engines: {ENGINES}"),
    })
}
