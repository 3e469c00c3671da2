/// Navigator trait - the presentation layer's location and history
pub trait Navigator: Send + Sync {
    /// Path of the view currently shown
    fn current_path(&self) -> String;

    /// Move to `path`
    fn push(&self, path: &str);
}
