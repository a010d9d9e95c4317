use crate::acquisition::{AcquisitionGroup, AcquisitionRecord};
use crate::enums::AcquisitionFlag;

use log::debug;

/// Pull-driven source of acquisition records.
///
/// `next_record` returns `None` once the transport's sentinel is seen or the
/// stream is exhausted. `close` releases the transport resource; the grouper
/// calls it exactly once on every exit path, including early drops.
pub trait AcquisitionStream {
    fn next_record(&mut self) -> Option<AcquisitionRecord>;
    fn close(&mut self);
}

/// Groups streamed readouts into complete volumetric acquisitions.
///
/// Phase-correction records are discarded; everything else accumulates until
/// a record carries the last-in-slice flag, which closes the group. The
/// finish flag is honored on rejected records too, so a trailing
/// phase-correction terminator still emits the group.
pub struct AcquisitionGrouper<S: AcquisitionStream> {
    stream: S,
    buffer: Vec<AcquisitionRecord>,
    closed: bool,
}

impl<S: AcquisitionStream> AcquisitionGrouper<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buffer: Vec::new(),
            closed: false,
        }
    }

    fn close_stream(&mut self) {
        if !self.closed {
            self.stream.close();
            self.closed = true;
        }
    }
}

impl<S: AcquisitionStream> Iterator for AcquisitionGrouper<S> {
    type Item = AcquisitionGroup;

    fn next(&mut self) -> Option<AcquisitionGroup> {
        if self.closed {
            return None;
        }

        loop {
            let Some(record) = self.stream.next_record() else {
                // Stream ended without a completion marker: the partial
                // buffer is never emitted.
                if !self.buffer.is_empty() {
                    debug!(
                        "discarding {} readouts without a completion marker",
                        self.buffer.len()
                    );
                    self.buffer.clear();
                }
                self.close_stream();
                return None;
            };

            let finished = record.is_flag_set(AcquisitionFlag::LastInSlice);

            if !record.is_flag_set(AcquisitionFlag::IsPhaseCorrection) {
                self.buffer.push(record);
            }

            if finished {
                return Some(std::mem::take(&mut self.buffer));
            }
        }
    }
}

impl<S: AcquisitionStream> Drop for AcquisitionGrouper<S> {
    fn drop(&mut self) {
        self.close_stream();
    }
}
