use crate::comm::{Communicator, Tag};
use crate::error::CommError;
use crate::karatsuba::{add_halves, karatsuba_mul, recombine, split_halves};
use crate::partition::{slice_range, slice_sizes};
use crate::schoolbook_mul::convolution_coeff;
use crate::{Karatsuba, Multiplier, Poly, WideCoeff};

pub const COLLECTOR: usize = 0;
pub const GATHER_TAG: Tag = Tag(1);

pub const COORDINATOR: usize = 0;
/// Coordinator plus one worker per Karatsuba sub-product.
pub const KARATSUBA_ROLES: usize = 4;

fn product_len(l: &Poly, r: &Poly) -> usize {
    if l.is_empty() || r.is_empty() {
        0
    } else {
        l.len() + r.len() - 1
    }
}

/// Each role computes its slice of the product's coefficients, and the slices are gathered
/// onto [`COLLECTOR`]. Other roles get `None`.
#[tracing::instrument(skip_all, name = "distributed_regular_mul", fields(rank = comm.rank()))]
pub fn distributed_regular_mul<C: Communicator>(
    comm: &mut C,
    l: &Poly,
    r: &Poly,
) -> Result<Option<Poly>, CommError> {
    let total = product_len(l, r);
    let workers = comm.size();
    let range = slice_range(total, workers, comm.rank());
    tracing::debug!(start = range.start, end = range.end, "computing slice");
    let local: Vec<_> = range.map(|k| convolution_coeff(l, r, k)).collect();
    let slices = match comm.gather_polys(COLLECTOR, GATHER_TAG, Poly::new(local))? {
        Some(slices) => slices,
        None => return Ok(None),
    };
    let mut coeffs = Vec::with_capacity(total);
    for (peer, (slice, expected)) in slices
        .into_iter()
        .zip(slice_sizes(total, workers))
        .enumerate()
    {
        if slice.len() != expected {
            return Err(CommError::LengthMismatch {
                peer,
                tag: GATHER_TAG.next(),
                expected,
                actual: slice.len(),
            });
        }
        coeffs.extend(slice.into_coeffs());
    }
    Ok(Some(Poly::new(coeffs)))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubProductTask {
    pub dest: usize,
    pub operands: [Vec<WideCoeff>; 2],
}

impl SubProductTask {
    pub fn operand_tags(dest: usize) -> [Tag; 2] {
        let base = 10 * dest as u32;
        [Tag(base), Tag(base + 2)]
    }
    pub fn reply_tag(dest: usize) -> Tag {
        Tag(100 * dest as u32)
    }
}

/// `low * low` goes to role 1, `high * high` to role 2, `(low + high) * (low + high)` to role 3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KaratsubaTopology {
    pub split: usize,
    pub tasks: [SubProductTask; 3],
}

impl KaratsubaTopology {
    pub fn plan(l: &Poly, r: &Poly) -> Self {
        let n = std::cmp::max(l.len(), r.len());
        let [l0, l1] = split_halves(&l.widened(), n);
        let [r0, r1] = split_halves(&r.widened(), n);
        let l_sum = add_halves(&l0, &l1);
        let r_sum = add_halves(&r0, &r1);
        KaratsubaTopology {
            split: n / 2,
            tasks: [
                SubProductTask {
                    dest: 1,
                    operands: [l0, r0],
                },
                SubProductTask {
                    dest: 2,
                    operands: [l1, r1],
                },
                SubProductTask {
                    dest: 3,
                    operands: [l_sum, r_sum],
                },
            ],
        }
    }

    fn dispatch<C: Communicator>(&self, comm: &mut C) -> Result<(), CommError> {
        for task in self.tasks.iter() {
            tracing::debug!(dest = task.dest, "dispatching sub-product");
            let tags = SubProductTask::operand_tags(task.dest);
            for (operand, &tag) in task.operands.iter().zip(tags.iter()) {
                comm.send_wide(task.dest, tag, operand)?;
            }
        }
        Ok(())
    }

    fn collect<C: Communicator>(&self, comm: &mut C) -> Result<[Vec<WideCoeff>; 3], CommError> {
        let [t0, t1, t2] = &self.tasks;
        Ok([
            comm.recv_wide(t0.dest, SubProductTask::reply_tag(t0.dest))?,
            comm.recv_wide(t1.dest, SubProductTask::reply_tag(t1.dest))?,
            comm.recv_wide(t2.dest, SubProductTask::reply_tag(t2.dest))?,
        ])
    }
}

fn serve_sub_product<C: Communicator, M: Multiplier>(
    comm: &mut C,
    worker: &M,
) -> Result<(), CommError> {
    let rank = comm.rank();
    let [l_tag, r_tag] = SubProductTask::operand_tags(rank);
    let l = comm.recv_wide(COORDINATOR, l_tag)?;
    let r = comm.recv_wide(COORDINATOR, r_tag)?;
    tracing::debug!(l_len = l.len(), r_len = r.len(), "computing sub-product");
    let prod = worker.multiply(&l, &r);
    comm.send_wide(COORDINATOR, SubProductTask::reply_tag(rank), &prod)
}

/// Distributed Karatsuba with the sequential Karatsuba multiplier on the worker roles.
pub fn distributed_karatsuba_mul<C: Communicator>(
    comm: &mut C,
    l: &Poly,
    r: &Poly,
) -> Result<Option<Poly>, CommError> {
    distributed_karatsuba_mul_with(comm, l, r, &Karatsuba)
}

/// Roles 1-3 compute the sub-products with `worker`; roles past 3 sit this out. With fewer
/// than [`KARATSUBA_ROLES`] roles, or an empty operand, the coordinator works alone.
#[tracing::instrument(skip_all, name = "distributed_karatsuba_mul", fields(rank = comm.rank()))]
pub fn distributed_karatsuba_mul_with<C: Communicator, M: Multiplier>(
    comm: &mut C,
    l: &Poly,
    r: &Poly,
    worker: &M,
) -> Result<Option<Poly>, CommError> {
    let rank = comm.rank();
    if comm.size() < KARATSUBA_ROLES || l.is_empty() || r.is_empty() {
        if rank != COORDINATOR {
            return Ok(None);
        }
        tracing::debug!(roles = comm.size(), "multiplying on the coordinator alone");
        return Ok(Some(karatsuba_mul(l, r).trimmed()));
    }
    match rank {
        COORDINATOR => {
            let topology = KaratsubaTopology::plan(l, r);
            topology.dispatch(comm)?;
            let [z0, z2, z1] = topology.collect(comm)?;
            let mut coeffs = recombine(&z0, &z1, &z2, topology.split);
            coeffs.truncate(product_len(l, r));
            Ok(Some(Poly::from_wide(coeffs).trimmed()))
        }
        rank if rank < KARATSUBA_ROLES => {
            serve_sub_product(comm, worker)?;
            Ok(None)
        }
        _ => Ok(None),
    }
}
