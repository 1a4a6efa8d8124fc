pub(crate) mod compose;
pub(crate) mod icon;
pub(crate) mod plan;
pub(crate) mod progress;
pub(crate) mod text;
