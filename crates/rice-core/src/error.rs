use thiserror::Error;

/// Faults raised while measuring or positioning the view tree.
///
/// The view id is reported as its debug rendering so this type stays
/// independent of the arena that owns the views.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("view {0} has a non-fixed size or alignment rule but no alignment target")]
    MissingAlignTarget(String),

    #[error("view {0} matches its parent on an axis where the parent wraps its content")]
    MatchParentInWrapParent(String),

    #[error("view {0} has neither a measured width nor a measured height")]
    Unmeasured(String),

    #[error("view {0} was laid out before its parent was measured")]
    ParentNotMeasured(String),

    #[error("no view with id {0} in this tree")]
    UnknownView(String),
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("pixel buffer holds {actual} values, expected {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        actual: usize,
    },

    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),
}
