//! # DataLoader
//!
//! Generic batching over any [`Dataset`], in the index order produced by a
//! [`Sampler`].
//!
//! ## Basic usage
//!
//! ```rust
//! use std::sync::Arc;
//! use stimulus_core::StimulusError;
//! use stimulus_data::dataloader::DataLoader;
//! use stimulus_data::datasets::Dataset;
//! use stimulus_data::samplers::SequentialSampler;
//!
//! struct Squares(usize);
//!
//! impl Dataset for Squares {
//!     type Item = usize;
//!     fn get(&self, index: usize) -> Result<usize, StimulusError> {
//!         Ok(index * index)
//!     }
//!     fn len(&self) -> usize {
//!         self.0
//!     }
//! }
//!
//! let loader = DataLoader::with_default_collate(Arc::new(Squares(5)), 2, SequentialSampler::new(), false)?;
//! let batches: Vec<Vec<usize>> = loader.iter().collect::<Result<_, _>>()?;
//! assert_eq!(batches, vec![vec![0, 1], vec![4, 9], vec![16]]);
//! # Ok::<(), StimulusError>(())
//! ```
//!
//! ## Iteration semantics
//!
//! - [`DataLoader::iter`] starts a fresh pass every time it is called, so the
//!   loader can be iterated any number of times.
//! - With `num_workers > 0`, batches are decoded ahead of the consumer by a
//!   pool of threads. Batch `b` is produced by worker `b % num_workers` into
//!   that worker's own bounded channel, and the consumer reads batch `b` from
//!   that channel. The emitted order is therefore exactly the sequential one.
//! - The first error ends the pass: it is yielded once and the iterator then
//!   returns `None`.
//! - Dropping a [`BatchIter`] disconnects the channels and joins all workers.

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use stimulus_core::StimulusError;

use crate::datasets::Dataset;
use crate::samplers::Sampler;

/// Collation function turning the items of one batch into the batch value.
pub type CollateFn<T, B> = Arc<dyn Fn(Vec<T>) -> Result<B, StimulusError> + Send + Sync>;

/// Fetches and collates the items at the given indices.
type FetchFn<B> = Arc<dyn Fn(&[usize]) -> Result<B, StimulusError> + Send + Sync>;

/// Batches per worker buffered ahead of the consumer unless configured.
pub const DEFAULT_PREFETCH_FACTOR: usize = 2;

/// Generic data loader for batching data in sampler order.
///
/// # Type parameters
/// - `D`: the dataset, shared with workers through an `Arc`.
/// - `S`: the sampler producing the index order.
/// - `B`: the batch type produced by the collate function.
pub struct DataLoader<D: Dataset, S: Sampler, B> {
    dataset: Arc<D>,
    batch_size: usize,
    sampler: S,
    drop_last: bool,
    num_workers: usize,
    prefetch_factor: usize,
    collate_fn: CollateFn<D::Item, B>,
}

impl<D, S, B> DataLoader<D, S, B>
where
    D: Dataset + 'static,
    S: Sampler,
    B: Send + 'static,
{
    /// Creates a new synchronous DataLoader.
    ///
    /// # Errors
    /// Returns `StimulusError::InvalidConfig` if `batch_size` is zero.
    pub fn new(
        dataset: Arc<D>,
        batch_size: usize,
        sampler: S,
        drop_last: bool,
        collate_fn: CollateFn<D::Item, B>,
    ) -> Result<Self, StimulusError> {
        if batch_size == 0 {
            return Err(StimulusError::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            dataset,
            batch_size,
            sampler,
            drop_last,
            num_workers: 0,
            prefetch_factor: DEFAULT_PREFETCH_FACTOR,
            collate_fn,
        })
    }

    /// Enables background decoding with `num_workers` threads, each keeping
    /// up to `prefetch_factor` finished batches buffered. `num_workers == 0`
    /// keeps loading on the calling thread.
    pub fn with_workers(mut self, num_workers: usize, prefetch_factor: usize) -> Self {
        self.num_workers = num_workers;
        self.prefetch_factor = prefetch_factor.max(1);
        self
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// The number of batches one pass yields when no error occurs.
    pub fn num_batches(&self) -> usize {
        let n = self.sampler.num_samples(self.dataset.len());
        if self.drop_last {
            n / self.batch_size
        } else {
            n.div_ceil(self.batch_size)
        }
    }

    /// Index groups for one pass, in emission order.
    fn batch_plan(&self) -> Vec<Vec<usize>> {
        let indices: Vec<usize> = self.sampler.indices(self.dataset.len()).collect();
        indices
            .chunks(self.batch_size)
            .filter(|chunk| !self.drop_last || chunk.len() == self.batch_size)
            .map(|chunk| chunk.to_vec())
            .collect()
    }

    fn fetch_fn(&self) -> FetchFn<B> {
        let dataset = Arc::clone(&self.dataset);
        let collate = Arc::clone(&self.collate_fn);
        Arc::new(move |indices: &[usize]| {
            let items = indices
                .iter()
                .map(|&i| dataset.get(i))
                .collect::<Result<Vec<_>, _>>()?;
            collate(items)
        })
    }

    /// Starts a new pass over the dataset.
    pub fn iter(&self) -> BatchIter<B> {
        let plan = Arc::new(self.batch_plan());
        let num_batches = plan.len();
        let fetch = self.fetch_fn();

        let workers = self.num_workers.min(num_batches);
        let mode = if workers == 0 {
            Mode::Sequential { fetch, plan }
        } else {
            match WorkerPool::spawn(Arc::clone(&fetch), Arc::clone(&plan), workers, self.prefetch_factor) {
                Ok(pool) => Mode::Prefetch(pool),
                Err(e) => {
                    warn!("Falling back to sequential loading: {}", e);
                    Mode::Sequential { fetch, plan }
                }
            }
        };

        BatchIter {
            mode,
            next_batch: 0,
            num_batches,
        }
    }
}

impl<D, S> DataLoader<D, S, Vec<D::Item>>
where
    D: Dataset + 'static,
    S: Sampler,
{
    /// Creates a DataLoader whose batches are plain `Vec`s of items.
    ///
    /// # Errors
    /// Same as [`DataLoader::new`].
    pub fn with_default_collate(
        dataset: Arc<D>,
        batch_size: usize,
        sampler: S,
        drop_last: bool,
    ) -> Result<Self, StimulusError> {
        let collate_fn: CollateFn<D::Item, Vec<D::Item>> = Arc::new(|batch: Vec<D::Item>| Ok::<_, StimulusError>(batch));
        Self::new(dataset, batch_size, sampler, drop_last, collate_fn)
    }
}

enum Mode<B> {
    Sequential {
        fetch: FetchFn<B>,
        plan: Arc<Vec<Vec<usize>>>,
    },
    Prefetch(WorkerPool<B>),
    Done,
}

/// One pass over a [`DataLoader`]. See the module docs for ordering and
/// shutdown guarantees.
pub struct BatchIter<B> {
    mode: Mode<B>,
    next_batch: usize,
    num_batches: usize,
}

impl<B> BatchIter<B> {
    /// Releases workers early; later calls to `next` return `None`.
    fn finish(&mut self) {
        self.mode = Mode::Done;
    }
}

impl<B> Iterator for BatchIter<B> {
    type Item = Result<B, StimulusError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_batch >= self.num_batches {
            self.finish();
            return None;
        }
        let b = self.next_batch;
        let result = match &self.mode {
            Mode::Sequential { fetch, plan } => fetch(&plan[b]),
            Mode::Prefetch(pool) => pool.recv(b),
            Mode::Done => return None,
        };
        self.next_batch += 1;
        if result.is_err() || self.next_batch == self.num_batches {
            self.finish();
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.mode {
            Mode::Done => (0, Some(0)),
            _ => (0, Some(self.num_batches - self.next_batch)),
        }
    }
}

/// Background workers with one bounded channel each.
struct WorkerPool<B> {
    receivers: Vec<Receiver<Result<B, StimulusError>>>,
    handles: Vec<JoinHandle<()>>,
}

impl<B: Send + 'static> WorkerPool<B> {
    fn spawn(
        fetch: FetchFn<B>,
        plan: Arc<Vec<Vec<usize>>>,
        workers: usize,
        capacity: usize,
    ) -> Result<Self, StimulusError> {
        let mut pool = WorkerPool {
            receivers: Vec::with_capacity(workers),
            handles: Vec::with_capacity(workers),
        };
        for w in 0..workers {
            let (tx, rx) = mpsc::sync_channel::<Result<B, StimulusError>>(capacity);
            let fetch = Arc::clone(&fetch);
            let plan = Arc::clone(&plan);
            let handle = thread::Builder::new()
                .name(format!("stimulus-loader-{w}"))
                .spawn(move || {
                    for b in (w..plan.len()).step_by(workers) {
                        let result = fetch(&plan[b]);
                        let failed = result.is_err();
                        // Receiver gone: the consumer dropped the iterator.
                        if tx.send(result).is_err() || failed {
                            break;
                        }
                    }
                })
                .map_err(|e| StimulusError::WorkerFailure(format!("cannot spawn worker {w}: {e}")))?;
            pool.receivers.push(rx);
            pool.handles.push(handle);
        }
        debug!("Spawned {} loader workers for {} batches", workers, plan.len());
        Ok(pool)
    }
}

impl<B> WorkerPool<B> {
    fn recv(&self, batch: usize) -> Result<B, StimulusError> {
        let w = batch % self.receivers.len();
        self.receivers[w].recv().unwrap_or_else(|_| {
            Err(StimulusError::WorkerFailure(format!(
                "worker {w} stopped before producing batch {batch}"
            )))
        })
    }
}

impl<B> Drop for WorkerPool<B> {
    fn drop(&mut self) {
        // Disconnect first so workers blocked on a full channel wake up.
        self.receivers.clear();
        for (w, handle) in self.handles.drain(..).enumerate() {
            if handle.join().is_err() {
                warn!("Loader worker {} panicked", w);
            }
        }
        debug!("Loader workers joined");
    }
}

#[cfg(test)]
#[path = "dataloader_test.rs"]
mod tests;
