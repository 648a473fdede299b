use std::{
    collections::VecDeque,
    fmt::Display,
    ops::{Index, IndexMut},
};

/// One indicator output line, aligned to bar offsets.
///
/// Each cell is `Some(value)` for a computed bar or `None` for "not computed /
/// not drawn". Offset `0` is the newest bar.
///
/// Cells are stored chronologically, so a shift by `k` new bars is `k` pushes
/// at the newest end, and every existing cell moves from offset `i` to
/// `i + k` without being touched.
///
/// Indexing past the current length panics; use [`get`](Self::get) for a
/// checked read.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputBuffer {
    name: &'static str,
    cells: VecDeque<Option<f64>>,
}

impl OutputBuffer {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            cells: VecDeque::new(),
        }
    }

    /// Buffer name, e.g. `"upper"` or `"trending"`.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of bars covered.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Value at `offset`, or `None` when the cell is empty or past the oldest
    /// bar.
    #[inline]
    #[must_use]
    pub fn get(&self, offset: usize) -> Option<f64> {
        self.index_of(offset).and_then(|i| self.cells[i])
    }

    /// Values from the newest bar (offset `0`) to the oldest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Option<f64>> + '_ {
        self.cells.iter().rev().copied()
    }

    /// Clears every cell and sizes the buffer to `len` bars.
    pub fn reset(&mut self, len: usize) {
        self.cells.clear();
        self.cells.resize(len, None);
    }

    /// Moves every cell from offset `i` to `i + shift` and empties offsets
    /// `0..shift`.
    pub fn shift(&mut self, shift: usize) {
        self.cells.extend(std::iter::repeat_n(None, shift));
    }

    /// Grows or shrinks the buffer at the oldest end. Offsets that remain
    /// keep their values.
    pub fn resize(&mut self, len: usize) {
        let current = self.cells.len();

        if len > current {
            for _ in current..len {
                self.cells.push_front(None);
            }
        } else {
            self.cells.drain(..current - len);
        }
    }

    #[inline]
    fn index_of(&self, offset: usize) -> Option<usize> {
        self.cells
            .len()
            .checked_sub(1)
            .and_then(|last| last.checked_sub(offset))
    }

    #[inline]
    fn expect_index(&self, offset: usize) -> usize {
        self.index_of(offset).unwrap_or_else(|| {
            panic!(
                "offset {offset} out of range for buffer '{}' of {} bars",
                self.name,
                self.cells.len()
            )
        })
    }
}

impl Index<usize> for OutputBuffer {
    type Output = Option<f64>;

    fn index(&self, offset: usize) -> &Self::Output {
        &self.cells[self.expect_index(offset)]
    }
}

impl IndexMut<usize> for OutputBuffer {
    fn index_mut(&mut self, offset: usize) -> &mut Self::Output {
        let index = self.expect_index(offset);
        &mut self.cells[index]
    }
}

impl Display for OutputBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.name, self.cells.len())
    }
}

/// A fixed set of [`OutputBuffer`]s kept aligned to the same bar count.
///
/// Buffers start unsized; the first [`reset`](Self::reset) sizes them.
#[derive(Clone, Debug, PartialEq)]
pub struct BufferSet<const N: usize> {
    buffers: [OutputBuffer; N],
    sized: bool,
}

impl<const N: usize> BufferSet<N> {
    #[must_use]
    pub fn new(names: [&'static str; N]) -> Self {
        Self {
            buffers: names.map(OutputBuffer::new),
            sized: false,
        }
    }

    /// `true` once the buffers have been sized by a reset.
    #[inline]
    #[must_use]
    pub fn is_sized(&self) -> bool {
        self.sized
    }

    /// Bar count shared by every buffer.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffers.first().map_or(0, OutputBuffer::len)
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empties every cell of every buffer and sizes them to `len` bars.
    pub fn reset(&mut self, len: usize) {
        for buffer in &mut self.buffers {
            buffer.reset(len);
        }
        self.sized = true;
    }

    /// Applies a shift of `shift` new bars to every buffer. No-op for zero.
    pub fn shift_sync(&mut self, shift: usize) {
        if shift == 0 {
            return;
        }

        for buffer in &mut self.buffers {
            buffer.shift(shift);
        }
    }

    /// Aligns every buffer to `len` bars at the oldest end.
    pub fn resize(&mut self, len: usize) {
        for buffer in &mut self.buffers {
            buffer.resize(len);
        }
    }

    /// Looks a buffer up by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&OutputBuffer> {
        self.buffers.iter().find(|b| b.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutputBuffer> {
        self.buffers.iter()
    }
}

impl<const N: usize> Index<usize> for BufferSet<N> {
    type Output = OutputBuffer;

    fn index(&self, index: usize) -> &Self::Output {
        &self.buffers[index]
    }
}

impl<const N: usize> IndexMut<usize> for BufferSet<N> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.buffers[index]
    }
}
