use anyhow::bail;
use clap::Parser;
use polymul::{
    distributed_karatsuba_mul, distributed_regular_mul, schoolbook_mul, Coeff, CommError,
    Communicator, LocalCluster, LocalComm, Poly, Tag,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::{Duration, Instant};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const LEFT_OPERAND_TAG: Tag = Tag(1000);
const RIGHT_OPERAND_TAG: Tag = Tag(1002);

/// Multiply two random polynomials with the distributed regular and Karatsuba multipliers.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Degree of both operands
    #[arg(long, default_value_t = 2000)]
    degree: usize,

    /// Number of roles, each running on its own thread
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Seed for operand generation; drawn from the OS when absent
    #[arg(long)]
    seed: Option<u64>,

    /// Coefficients are drawn uniformly from 0..=max-coeff
    #[arg(long, default_value_t = 9)]
    max_coeff: Coeff,

    /// Check both products against the sequential schoolbook product
    #[arg(long)]
    verify: bool,
}

struct Timed {
    product: Poly,
    elapsed: Duration,
}

struct Report {
    operands: (Poly, Poly),
    regular: Timed,
    karatsuba: Timed,
}

fn run_role(
    comm: &mut LocalComm,
    operands: Option<&(Poly, Poly)>,
) -> Result<Option<Report>, CommError> {
    let root = comm.rank() == 0;
    let l = comm.broadcast_poly(0, LEFT_OPERAND_TAG, operands.map(|(l, _)| l.clone()))?;
    let r = comm.broadcast_poly(0, RIGHT_OPERAND_TAG, operands.map(|(_, r)| r.clone()))?;

    comm.barrier()?;
    let start = Instant::now();
    let regular = distributed_regular_mul(comm, &l, &r)?;
    let regular_elapsed = start.elapsed();

    // A role that bailed out above breaks this barrier instead of leaving the rest hanging.
    comm.barrier()?;
    let start = Instant::now();
    let karatsuba = distributed_karatsuba_mul(comm, &l, &r)?;
    let karatsuba_elapsed = start.elapsed();

    match (root, regular, karatsuba) {
        (true, Some(regular), Some(karatsuba)) => Ok(Some(Report {
            operands: (l, r),
            regular: Timed {
                product: regular,
                elapsed: regular_elapsed,
            },
            karatsuba: Timed {
                product: karatsuba,
                elapsed: karatsuba_elapsed,
            },
        })),
        _ => Ok(None),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();
    if args.workers == 0 {
        bail!("--workers must be at least 1");
    }
    if args.max_coeff < 0 {
        bail!("--max-coeff must not be negative");
    }

    let mut rng = match args.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let operands = (
        Poly::random(&mut rng, args.degree, args.max_coeff),
        Poly::random(&mut rng, args.degree, args.max_coeff),
    );
    info!(degree = args.degree, workers = args.workers, "generated operands");
    println!("Polynomial degree: {}", args.degree);

    let results = LocalCluster::new(args.workers).run(|comm| {
        let root_operands = if comm.rank() == 0 { Some(&operands) } else { None };
        run_role(comm, root_operands)
    })?;
    let mut report = None;
    let mut failure = None;
    for (rank, result) in results.into_iter().enumerate() {
        match result {
            Ok(Some(r)) => report = Some(r),
            Ok(None) => {}
            Err(err) => {
                error!(rank, %err, "role failed");
                // Barrier failures only echo whatever made a role leave.
                if failure.is_none() || failure == Some(CommError::BarrierAbandoned) {
                    failure = Some(err);
                }
            }
        }
    }
    if let Some(err) = failure {
        return Err(err.into());
    }
    let report = match report {
        Some(report) => report,
        None => bail!("coordinator produced no result"),
    };

    info!(elapsed = ?report.regular.elapsed, "distributed regular done");
    info!(elapsed = ?report.karatsuba.elapsed, "distributed karatsuba done");
    println!(
        "Distributed regular:   {:.3} s",
        report.regular.elapsed.as_secs_f64()
    );
    println!(
        "Distributed Karatsuba: {:.3} s",
        report.karatsuba.elapsed.as_secs_f64()
    );

    if args.verify {
        let (l, r) = &report.operands;
        let expected = schoolbook_mul(l, r);
        if report.regular.product != expected {
            bail!("distributed regular product does not match the sequential product");
        }
        if report.karatsuba.product != expected.trimmed() {
            bail!("distributed Karatsuba product does not match the sequential product");
        }
        println!("Both products match the sequential product");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operands() -> (Poly, Poly) {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        (
            Poly::random(&mut rng, 150, 9),
            Poly::random(&mut rng, 150, 9),
        )
    }

    #[test]
    fn root_reports_both_products() {
        let operands = operands();
        let results = LocalCluster::new(4)
            .run(|comm| {
                let root_operands = if comm.rank() == 0 { Some(&operands) } else { None };
                run_role(comm, root_operands)
            })
            .unwrap();
        let expected = schoolbook_mul(&operands.0, &operands.1);
        match &results[0] {
            Ok(Some(report)) => {
                assert_eq!(report.regular.product, expected);
                assert_eq!(report.karatsuba.product, expected.trimmed());
            }
            _ => panic!("no report from the root"),
        }
        assert!(results[1..].iter().all(|r| matches!(r, Ok(None))));
    }

    #[test]
    fn a_failed_role_does_not_hang_the_rest() {
        let operands = operands();
        let results = LocalCluster::new(3)
            .run(|comm| {
                if comm.rank() == 1 {
                    return Err(CommError::Disconnected { peer: 0 });
                }
                let root_operands = if comm.rank() == 0 { Some(&operands) } else { None };
                run_role(comm, root_operands)
            })
            .unwrap();
        assert!(results.iter().all(|r| r.is_err()));
    }
}
