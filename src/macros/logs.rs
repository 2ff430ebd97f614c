macro_rules! debug_path {
    ($description: expr, $path: ident) => {
        tracing::debug!(
            "{PROVIDER} - {} exists at {:?}: {}",
            $description,
            $path,
            $path.exists()
        );
    };
}
pub(crate) use debug_path;
