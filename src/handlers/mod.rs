// Handlers grouped by access tier:
// public (no identity needed) and protected (behind the context middleware,
// each handler applies its own allow-list).
pub mod protected;
pub mod public;
