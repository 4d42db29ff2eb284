pub(crate) mod screenshot;
