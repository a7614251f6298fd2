//! Per-frame stages that turn a captured frame into a printable card.
//!
//! Each submodule implements exactly one transformation step, applied in
//! this fixed order:
//!
//! ```text
//! frame ──▶ margin ──▶ border ──▶ stamp ──▶ encode
//!          (binding)  (cut line) (number)  (PNG)
//! ```
//!
//! 1. [`margin`]: white strip on the left edge, width derived from the
//!    physical layout
//! 2. [`border`]: one-pixel grey cut guide around frame and margin
//! 3. [`stamp`]: 1-based card number in the lower-left corner
//! 4. [`encode`]: lossless PNG bytes for embedding

pub mod border;
pub mod encode;
pub mod margin;
pub mod stamp;
