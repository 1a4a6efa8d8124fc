pub(crate) mod assemble;
