
mod test_assembly;
mod test_pipeline;
