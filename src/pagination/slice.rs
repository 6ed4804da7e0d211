//! Stepped views over a [`PaginatedList`]

use super::list::PaginatedList;
use super::types::ItemStream;
use crate::error::{Error, Result};
use futures::{stream, TryStreamExt};
use std::sync::Arc;

/// A `start..stop` view with a step, grown lazily through its parent list.
///
/// Running past the end of the list ends the view without an error. The
/// view can be streamed any number of times.
pub struct Slice<'a, T> {
    list: &'a mut PaginatedList<T>,
    start: usize,
    stop: Option<usize>,
    step: usize,
}

impl<'a, T> Slice<'a, T> {
    pub(crate) fn new(
        list: &'a mut PaginatedList<T>,
        start: usize,
        stop: Option<usize>,
        step: usize,
    ) -> Self {
        Self {
            list,
            start,
            stop,
            step,
        }
    }

    /// First index of the view
    pub fn start(&self) -> usize {
        self.start
    }

    /// Exclusive end of the view, `None` when open-ended
    pub fn stop(&self) -> Option<usize> {
        self.stop
    }

    /// Distance between consecutive indices
    pub fn step(&self) -> usize {
        self.step
    }
}

impl<T: Send + Sync> Slice<'_, T> {
    /// Stream the elements of the view
    pub fn stream(&mut self) -> ItemStream<'_, T> {
        let (stop, step) = (self.stop, self.step);
        let list = &mut *self.list;

        Box::pin(stream::try_unfold(
            (list, Some(self.start)),
            move |(list, index)| async move {
                let Some(index) = index else {
                    return Ok(None);
                };
                if stop.is_some_and(|stop| index >= stop) || !list.is_larger_than(index) {
                    return Ok(None);
                }
                match list.get_at(index).await {
                    Ok(element) => Ok(Some((element, (list, index.checked_add(step))))),
                    Err(e) if e.is_out_of_range() => Ok(None),
                    Err(e) => Err::<_, Error>(e),
                }
            },
        ))
    }

    /// Collect the elements of the view
    pub async fn collect(&mut self) -> Result<Vec<Arc<T>>> {
        self.stream().try_collect().await
    }
}

impl<T> std::fmt::Debug for Slice<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slice")
            .field("list", &self.list)
            .field("start", &self.start)
            .field("stop", &self.stop)
            .field("step", &self.step)
            .finish()
    }
}
