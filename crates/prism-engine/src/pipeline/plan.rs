/// One of the two intermediate colour buffers.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    #[inline]
    pub fn other(self) -> Self {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            Slot::A => 0,
            Slot::B => 1,
        }
    }
}

/// Where a step writes.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Output {
    Buffer(Slot),
    Surface,
}

/// What a step runs.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Stage {
    /// Scene + camera draw; always first.
    Scene,
    /// Effect at `index` in construction order.
    Effect { index: usize, name: String },
}

impl Stage {
    pub fn name(&self) -> &str {
        match self {
            Stage::Scene => "scene",
            Stage::Effect { name, .. } => name,
        }
    }
}

/// One render step of a frame.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Step {
    pub stage: Stage,
    /// Buffer sampled by the step; `None` for the scene stage.
    pub input: Option<Slot>,
    pub output: Output,
}

/// Chains the scene stage and the given enabled effects.
///
/// The scene renders into `A`, effects ping-pong between `A` and `B`, and the
/// last step writes to the surface. With no effects the scene goes straight to
/// the surface.
pub(crate) fn plan_steps<'a>(enabled: impl IntoIterator<Item = (usize, &'a str)>) -> Vec<Step> {
    let enabled: Vec<(usize, &str)> = enabled.into_iter().collect();

    let mut steps = Vec::with_capacity(enabled.len() + 1);
    let mut current = Slot::A;

    steps.push(Step {
        stage: Stage::Scene,
        input: None,
        output: if enabled.is_empty() { Output::Surface } else { Output::Buffer(current) },
    });

    let last = enabled.len().saturating_sub(1);
    for (i, (index, name)) in enabled.into_iter().enumerate() {
        let output = if i == last { Output::Surface } else { Output::Buffer(current.other()) };
        steps.push(Step {
            stage: Stage::Effect { index, name: name.to_string() },
            input: Some(current),
            output,
        });
        current = current.other();
    }

    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effect(index: usize, name: &str) -> Stage {
        Stage::Effect { index, name: name.to_string() }
    }

    #[test]
    fn scene_only_goes_to_surface() {
        let steps = plan_steps(Vec::<(usize, &str)>::new());
        assert_eq!(steps, vec![Step { stage: Stage::Scene, input: None, output: Output::Surface }]);
    }

    #[test]
    fn effects_ping_pong_and_last_hits_surface() {
        let steps = plan_steps([(0, "fxaa"), (1, "invert"), (2, "halftone")]);
        assert_eq!(
            steps,
            vec![
                Step { stage: Stage::Scene, input: None, output: Output::Buffer(Slot::A) },
                Step { stage: effect(0, "fxaa"), input: Some(Slot::A), output: Output::Buffer(Slot::B) },
                Step { stage: effect(1, "invert"), input: Some(Slot::B), output: Output::Buffer(Slot::A) },
                Step { stage: effect(2, "halftone"), input: Some(Slot::A), output: Output::Surface },
            ]
        );
    }

    #[test]
    fn every_input_was_the_previous_output() {
        let steps = plan_steps((0..7).map(|i| (i, "e")));
        for pair in steps.windows(2) {
            assert_eq!(pair[0].output, Output::Buffer(pair[1].input.unwrap()));
        }
        assert_eq!(steps.last().unwrap().output, Output::Surface);
    }
}
