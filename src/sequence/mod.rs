pub(crate) mod circular;
