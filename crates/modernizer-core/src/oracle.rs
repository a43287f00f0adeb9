/// External rewrite service.
///
/// Implementations map every failure (transport errors, refusals, empty
/// replies) to `None`; the repair loop treats that as a hard stop.
pub trait RewriteOracle {
    fn propose(&self, code: &str, instructions: &str) -> Option<String>;
}

impl<T: RewriteOracle + ?Sized> RewriteOracle for &T {
    fn propose(&self, code: &str, instructions: &str) -> Option<String> {
        (**self).propose(code, instructions)
    }
}

impl<T: RewriteOracle + ?Sized> RewriteOracle for Box<T> {
    fn propose(&self, code: &str, instructions: &str) -> Option<String> {
        (**self).propose(code, instructions)
    }
}
