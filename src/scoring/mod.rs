// Scoring pipeline: home-run probabilities, DFS value ranking, narratives.

pub mod dfs;
pub mod engine;
pub mod insight;
