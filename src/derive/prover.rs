use crate::core::{DeriveError, SourceSpan};

use super::rules::Rule;
use super::syntax::{Derivation, Judgment, Strategy};

/// Every rule's premises shrink some operand, so valid judgments stay far
/// below this. The cap turns a selection bug into an error instead of a
/// stack overflow.
const MAX_DEPTH: usize = 4096;

/// Builds the full derivation of `judgment`, premises included.
///
/// The strategy, when present, is threaded unchanged into every inequality
/// premise, so one directive governs the whole tree. `origin` is the source
/// span the judgment was parsed from; synthesized premises inherit it, so
/// every failure points at the judgment that was asked for.
pub(super) fn prove(
    judgment: Judgment,
    strategy: Option<Strategy>,
    origin: SourceSpan,
) -> Result<Derivation, DeriveError> {
    prove_with_limit(judgment, strategy, origin, MAX_DEPTH)
}

pub(super) fn prove_with_limit(
    judgment: Judgment,
    strategy: Option<Strategy>,
    origin: SourceSpan,
    limit: usize,
) -> Result<Derivation, DeriveError> {
    prove_at(judgment, strategy, &origin, 0, limit)
}

fn prove_at(
    judgment: Judgment,
    strategy: Option<Strategy>,
    origin: &SourceSpan,
    depth: usize,
    limit: usize,
) -> Result<Derivation, DeriveError> {
    if depth >= limit {
        return Err(DeriveError::DepthLimitExceeded { limit });
    }

    let rule = Rule::select(&judgment, strategy, origin)?;
    let premises = rule
        .premises()
        .into_iter()
        .map(|premise| prove_at(premise, strategy, origin, depth + 1, limit))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Derivation {
        judgment: rule.conclusion(),
        rule_name: rule.label(),
        premises,
    })
}
