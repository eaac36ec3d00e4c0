use crate::error::CommError;
use crate::{Coeff, Poly, WideCoeff};
use std::collections::VecDeque;
use std::fmt;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u32);

impl Tag {
    /// Tag of the coefficient frame that follows a header sent on `self`.
    pub const fn next(self) -> Tag {
        Tag(self.0 + 1)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tag {}", self.0)
    }
}

/// A transfer is a header on `tag` followed by its coefficients on `tag.next()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Header { len: usize },
    Coefficients(Vec<Coeff>),
    WideCoefficients(Vec<WideCoeff>),
}

#[derive(Debug)]
struct Envelope {
    tag: Tag,
    frame: Frame,
}

pub trait Communicator {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;
    fn send_frame(&mut self, dest: usize, tag: Tag, frame: Frame) -> Result<(), CommError>;
    /// Blocks until a frame from `source` carrying `tag` is available.
    fn recv_frame(&mut self, source: usize, tag: Tag) -> Result<Frame, CommError>;
    /// Blocks until every role has called `barrier`. Fails if a role left instead.
    fn barrier(&mut self) -> Result<(), CommError>;

    fn send_poly(&mut self, dest: usize, tag: Tag, p: &Poly) -> Result<(), CommError> {
        self.send_frame(dest, tag, Frame::Header { len: p.len() })?;
        self.send_frame(dest, tag.next(), Frame::Coefficients(p.coeffs().to_vec()))
    }

    fn send_wide(
        &mut self,
        dest: usize,
        tag: Tag,
        coeffs: &[WideCoeff],
    ) -> Result<(), CommError> {
        self.send_frame(dest, tag, Frame::Header { len: coeffs.len() })?;
        self.send_frame(dest, tag.next(), Frame::WideCoefficients(coeffs.to_vec()))
    }

    fn recv_header(&mut self, source: usize, tag: Tag) -> Result<usize, CommError> {
        match self.recv_frame(source, tag)? {
            Frame::Header { len } => Ok(len),
            _ => Err(CommError::UnexpectedFrame { peer: source, tag }),
        }
    }

    fn recv_poly(&mut self, source: usize, tag: Tag) -> Result<Poly, CommError> {
        let expected = self.recv_header(source, tag)?;
        let tag = tag.next();
        match self.recv_frame(source, tag)? {
            Frame::Coefficients(coeffs) => {
                check_len(source, tag, expected, coeffs.len())?;
                Ok(Poly::new(coeffs))
            }
            _ => Err(CommError::UnexpectedFrame { peer: source, tag }),
        }
    }

    fn recv_wide(&mut self, source: usize, tag: Tag) -> Result<Vec<WideCoeff>, CommError> {
        let expected = self.recv_header(source, tag)?;
        let tag = tag.next();
        match self.recv_frame(source, tag)? {
            Frame::WideCoefficients(coeffs) => {
                check_len(source, tag, expected, coeffs.len())?;
                Ok(coeffs)
            }
            _ => Err(CommError::UnexpectedFrame { peer: source, tag }),
        }
    }

    /// Only `root` needs to pass `Some`; a `None` there broadcasts the empty polynomial.
    #[tracing::instrument(skip_all, name = "broadcast_poly", fields(rank = self.rank()))]
    fn broadcast_poly(&mut self, root: usize, tag: Tag, p: Option<Poly>) -> Result<Poly, CommError> {
        check_rank(root, self.size())?;
        if self.rank() != root {
            return self.recv_poly(root, tag);
        }
        let p = p.unwrap_or_default();
        for dest in (0..self.size()).filter(|&dest| dest != root) {
            self.send_poly(dest, tag, &p)?;
        }
        Ok(p)
    }

    /// Collects one polynomial from every role onto `root`, in rank order.
    #[tracing::instrument(skip_all, name = "gather_polys", fields(rank = self.rank()))]
    fn gather_polys(
        &mut self,
        root: usize,
        tag: Tag,
        local: Poly,
    ) -> Result<Option<Vec<Poly>>, CommError> {
        check_rank(root, self.size())?;
        if self.rank() != root {
            self.send_poly(root, tag, &local)?;
            return Ok(None);
        }
        let mut local = Some(local);
        let mut out = Vec::with_capacity(self.size());
        for source in 0..self.size() {
            if source == root {
                out.push(local.take().unwrap_or_default());
            } else {
                out.push(self.recv_poly(source, tag)?);
            }
        }
        Ok(Some(out))
    }
}

fn check_rank(rank: usize, size: usize) -> Result<(), CommError> {
    if rank >= size {
        return Err(CommError::InvalidRank { rank, size });
    }
    Ok(())
}

fn check_len(peer: usize, tag: Tag, expected: usize, actual: usize) -> Result<(), CommError> {
    if actual != expected {
        return Err(CommError::LengthMismatch {
            peer,
            tag,
            expected,
            actual,
        });
    }
    Ok(())
}

#[derive(Debug, Default)]
struct BarrierState {
    arrived: usize,
    generation: u64,
    departed: usize,
}

/// Like `std::sync::Barrier`, except that waiting fails once any role has dropped its
/// endpoint, where the std one would wait forever.
#[derive(Debug)]
struct RoleBarrier {
    size: usize,
    state: Mutex<BarrierState>,
    cvar: Condvar,
}

impl RoleBarrier {
    fn new(size: usize) -> Self {
        RoleBarrier {
            size,
            state: Mutex::new(BarrierState::default()),
            cvar: Condvar::new(),
        }
    }

    fn wait(&self) -> Result<(), CommError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.departed > 0 {
            return Err(CommError::BarrierAbandoned);
        }
        let generation = state.generation;
        state.arrived += 1;
        if state.arrived == self.size {
            state.arrived = 0;
            state.generation += 1;
            self.cvar.notify_all();
            return Ok(());
        }
        while state.generation == generation && state.departed == 0 {
            state = self.cvar.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        if state.generation == generation {
            return Err(CommError::BarrierAbandoned);
        }
        Ok(())
    }

    fn leave(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.departed += 1;
        self.cvar.notify_all();
    }
}

/// One role's endpoint in a [`LocalCluster`].
pub struct LocalComm {
    rank: usize,
    // outboxes[dest] and inboxes[source]; one FIFO per ordered pair of roles.
    outboxes: Vec<Sender<Envelope>>,
    inboxes: Vec<Receiver<Envelope>>,
    // Frames that arrived ahead of the receive that wants them, per source.
    parked: Vec<VecDeque<Envelope>>,
    barrier: Arc<RoleBarrier>,
}

impl Drop for LocalComm {
    fn drop(&mut self) {
        self.barrier.leave();
    }
}

impl Communicator for LocalComm {
    fn rank(&self) -> usize {
        self.rank
    }
    fn size(&self) -> usize {
        self.outboxes.len()
    }

    fn send_frame(&mut self, dest: usize, tag: Tag, frame: Frame) -> Result<(), CommError> {
        check_rank(dest, self.size())?;
        tracing::trace!(rank = self.rank, dest, %tag, "send");
        self.outboxes[dest]
            .send(Envelope { tag, frame })
            .map_err(|_| CommError::Disconnected { peer: dest })
    }

    fn recv_frame(&mut self, source: usize, tag: Tag) -> Result<Frame, CommError> {
        check_rank(source, self.size())?;
        let parked = &mut self.parked[source];
        if let Some(pos) = parked.iter().position(|envelope| envelope.tag == tag) {
            if let Some(envelope) = parked.remove(pos) {
                return Ok(envelope.frame);
            }
        }
        loop {
            let envelope = self.inboxes[source]
                .recv()
                .map_err(|_| CommError::Disconnected { peer: source })?;
            if envelope.tag == tag {
                tracing::trace!(rank = self.rank, source, %tag, "recv");
                return Ok(envelope.frame);
            }
            tracing::trace!(rank = self.rank, source, tag = %envelope.tag, "parked");
            self.parked[source].push_back(envelope);
        }
    }

    fn barrier(&mut self) -> Result<(), CommError> {
        self.barrier.wait()
    }
}

/// A fixed set of roles living in one process, one thread per role.
pub struct LocalCluster {
    comms: Vec<LocalComm>,
}

impl LocalCluster {
    pub fn new(size: usize) -> Self {
        let barrier = Arc::new(RoleBarrier::new(size));
        let mut outboxes: Vec<Vec<Sender<Envelope>>> = (0..size).map(|_| Vec::new()).collect();
        let mut inboxes: Vec<Vec<Receiver<Envelope>>> = (0..size).map(|_| Vec::new()).collect();
        for sender in 0..size {
            for receiver in 0..size {
                let (tx, rx) = channel();
                outboxes[sender].push(tx);
                inboxes[receiver].push(rx);
            }
        }
        let comms = outboxes
            .into_iter()
            .zip(inboxes)
            .enumerate()
            .map(|(rank, (outboxes, inboxes))| LocalComm {
                rank,
                outboxes,
                inboxes,
                parked: (0..size).map(|_| VecDeque::new()).collect(),
                barrier: barrier.clone(),
            })
            .collect();
        LocalCluster { comms }
    }

    /// Runs `f` once per role, each on its own thread, and returns the results in rank order.
    pub fn run<T, F>(self, f: F) -> Result<Vec<T>, CommError>
    where
        F: Fn(&mut LocalComm) -> T + Sync,
        T: Send,
    {
        let f = &f;
        std::thread::scope(|s| {
            let handles: Vec<_> = self
                .comms
                .into_iter()
                .map(|mut comm| s.spawn(move || f(&mut comm)))
                .collect();
            handles
                .into_iter()
                .enumerate()
                .map(|(rank, handle)| handle.join().map_err(|_| CommError::RolePanicked { rank }))
                .collect()
        })
    }
}
