//! Synthesis Context - 降级阶梯状态机
//!
//! AttemptPrimary → AttemptBuiltinFallback → AttemptLocalSample → ClientSideInstruction → Done
//!
//! 纯函数，不做任何 I/O；编排器只负责执行当前步骤并在失败时询问下一步

use super::SynthesisTier;

/// 阶梯步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LadderStep {
    AttemptPrimary,
    AttemptBuiltinFallback,
    AttemptLocalSample,
    ClientSideInstruction,
    Done,
}

impl LadderStep {
    /// 该步骤成功时对应的层级
    pub fn tier(&self) -> Option<SynthesisTier> {
        match self {
            LadderStep::AttemptPrimary => Some(SynthesisTier::PrimaryClone),
            LadderStep::AttemptBuiltinFallback => Some(SynthesisTier::FallbackBuiltinVoice),
            LadderStep::AttemptLocalSample => Some(SynthesisTier::LocalSample),
            LadderStep::ClientSideInstruction => Some(SynthesisTier::ClientSideSynthesis),
            LadderStep::Done => None,
        }
    }

    /// 该步骤需要调用服务商
    pub fn uses_provider(&self) -> bool {
        matches!(
            self,
            LadderStep::AttemptPrimary | LadderStep::AttemptBuiltinFallback
        )
    }
}

/// 决定阶梯走向的请求属性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LadderPlan {
    /// 请求的音色是克隆类（服务商克隆或本地占位）
    pub voice_is_clone: bool,
    /// 请求的音色可以提交给服务商
    pub voice_is_synthesizable: bool,
    /// 请求的音色就是内置兜底音色
    pub voice_is_builtin_fallback: bool,
}

/// 起始步骤
pub fn first_step(plan: &LadderPlan) -> LadderStep {
    if plan.voice_is_synthesizable {
        LadderStep::AttemptPrimary
    } else if plan.voice_is_clone {
        LadderStep::AttemptLocalSample
    } else {
        LadderStep::ClientSideInstruction
    }
}

/// 当前步骤失败后的下一步
pub fn next_step(current: LadderStep, plan: &LadderPlan) -> LadderStep {
    match current {
        LadderStep::AttemptPrimary if plan.voice_is_builtin_fallback => {
            next_step(LadderStep::AttemptBuiltinFallback, plan)
        }
        LadderStep::AttemptPrimary => LadderStep::AttemptBuiltinFallback,
        LadderStep::AttemptBuiltinFallback if plan.voice_is_clone => {
            LadderStep::AttemptLocalSample
        }
        LadderStep::AttemptBuiltinFallback => LadderStep::ClientSideInstruction,
        LadderStep::AttemptLocalSample => LadderStep::ClientSideInstruction,
        LadderStep::ClientSideInstruction | LadderStep::Done => LadderStep::Done,
    }
}

/// 阶梯的最大层数
pub const MAX_TIERS: usize = 4;

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(clone: bool, synthesizable: bool, builtin: bool) -> LadderPlan {
        LadderPlan {
            voice_is_clone: clone,
            voice_is_synthesizable: synthesizable,
            voice_is_builtin_fallback: builtin,
        }
    }

    /// 从起点一直失败到底，返回经过的步骤
    fn walk(plan: &LadderPlan) -> Vec<LadderStep> {
        let mut steps = Vec::new();
        let mut step = first_step(plan);
        while step != LadderStep::Done {
            steps.push(step);
            step = next_step(step, plan);
            assert!(steps.len() <= MAX_TIERS, "ladder did not terminate: {:?}", steps);
        }
        steps
    }

    #[test]
    fn test_clone_voice_walks_all_tiers() {
        assert_eq!(
            walk(&plan(true, true, false)),
            vec![
                LadderStep::AttemptPrimary,
                LadderStep::AttemptBuiltinFallback,
                LadderStep::AttemptLocalSample,
                LadderStep::ClientSideInstruction,
            ]
        );
    }

    #[test]
    fn test_builtin_voice_skips_local_sample() {
        assert_eq!(
            walk(&plan(false, true, false)),
            vec![
                LadderStep::AttemptPrimary,
                LadderStep::AttemptBuiltinFallback,
                LadderStep::ClientSideInstruction,
            ]
        );
    }

    #[test]
    fn test_requesting_builtin_fallback_voice_does_not_repeat_it() {
        assert_eq!(
            walk(&plan(false, true, true)),
            vec![LadderStep::AttemptPrimary, LadderStep::ClientSideInstruction]
        );
    }

    #[test]
    fn test_placeholder_starts_at_local_sample() {
        assert_eq!(
            walk(&plan(true, false, false)),
            vec![LadderStep::AttemptLocalSample, LadderStep::ClientSideInstruction]
        );
    }

    #[test]
    fn test_every_plan_terminates_within_bound() {
        for clone in [false, true] {
            for synthesizable in [false, true] {
                for builtin in [false, true] {
                    let steps = walk(&plan(clone, synthesizable, builtin));
                    assert!(!steps.is_empty());
                    assert!(steps.len() <= MAX_TIERS);
                    assert_eq!(*steps.last().unwrap(), LadderStep::ClientSideInstruction);
                }
            }
        }
    }

    #[test]
    fn test_only_first_two_tiers_call_provider() {
        let provider_steps: Vec<_> = walk(&plan(true, true, false))
            .into_iter()
            .filter(LadderStep::uses_provider)
            .collect();
        assert_eq!(
            provider_steps,
            vec![LadderStep::AttemptPrimary, LadderStep::AttemptBuiltinFallback]
        );
    }

    #[test]
    fn test_done_is_absorbing() {
        let p = plan(true, true, false);
        assert_eq!(next_step(LadderStep::Done, &p), LadderStep::Done);
        assert_eq!(next_step(LadderStep::ClientSideInstruction, &p), LadderStep::Done);
    }
}
