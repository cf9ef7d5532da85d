// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! System prompt templates and mode dispatch
//!
//! Each conversation turn is governed by a mode tag supplied by the caller.
//! Dispatch is a lookup table over an enumerated tag; unrecognized tags map
//! to an explicit Unknown variant that resolves to the default drafting
//! template, so the fallback is a testable case rather than fall-through.

/// Mode tag selecting the system prompt for a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Default PRD-drafting mode
    Draft,
    /// Structured discovery interview
    Interview,
    /// User-story decomposition
    Stories,
    /// Impact / gap analysis
    Impact,
    /// Any unrecognized tag; resolves to the default template
    Unknown,
}

impl Mode {
    /// Parse a caller-supplied tag. Never fails; unrecognized tags become
    /// `Unknown`.
    pub fn parse(tag: &str) -> Self {
        match tag.trim() {
            "" | "draft" => Mode::Draft,
            "interview" => Mode::Interview,
            "stories" => Mode::Stories,
            "impact" => Mode::Impact,
            _ => Mode::Unknown,
        }
    }

    /// Canonical tag string
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Draft => "draft",
            Mode::Interview => "interview",
            Mode::Stories => "stories",
            Mode::Impact => "impact",
            Mode::Unknown => "unknown",
        }
    }

    /// Which project artifact slot a completed turn in this mode populates.
    ///
    /// The slot is decided by the caller-supplied mode, never by scanning
    /// the generated text. Interview turns produce questions, not artifacts.
    pub fn artifact_slot(&self) -> Option<ArtifactSlot> {
        match self {
            Mode::Draft | Mode::Unknown => Some(ArtifactSlot::FullPrd),
            Mode::Stories => Some(ArtifactSlot::UserStories),
            Mode::Impact => Some(ArtifactSlot::ImpactAnalysis),
            Mode::Interview => None,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project artifact slot a finished turn populates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactSlot {
    FullPrd,
    UserStories,
    ImpactAnalysis,
}

/// Caller context interpolated into every template
#[derive(Debug, Clone)]
pub struct PromptContext {
    /// Perspective the assistant is helping (e.g. "Senior PM")
    pub user_role: String,
    /// Company/business context; may be empty
    pub company_context: String,
}

impl PromptContext {
    pub fn new(user_role: impl Into<String>, company_context: impl Into<String>) -> Self {
        Self {
            user_role: user_role.into(),
            company_context: company_context.into(),
        }
    }

    /// Company context with the documented default for empty input
    pub fn company_or_default(&self) -> &str {
        if self.company_context.trim().is_empty() {
            "an enterprise organization"
        } else {
            &self.company_context
        }
    }
}

type TemplateFn = fn(&PromptContext) -> String;

/// Mode-to-template lookup table
const TEMPLATES: [(Mode, TemplateFn); 4] = [
    (Mode::Draft, draft_template),
    (Mode::Interview, interview_template),
    (Mode::Stories, stories_template),
    (Mode::Impact, impact_template),
];

/// Render the system prompt for a mode.
///
/// `Unknown` resolves to the default drafting template.
pub fn system_prompt(mode: Mode, ctx: &PromptContext) -> String {
    let effective = match mode {
        Mode::Unknown => Mode::Draft,
        other => other,
    };
    TEMPLATES
        .iter()
        .find(|(m, _)| *m == effective)
        .map(|(_, render)| render(ctx))
        .unwrap_or_else(|| draft_template(ctx))
}

/// Canned quick-action prompt: generate the PRD from the discussion so far
pub const DRAFT_NOW_PROMPT: &str =
    "Please generate a comprehensive PRD based on our discussion so far.";

/// Canned quick-action prompt: CPO-level gap analysis of the current requirement
pub const GAP_ANALYSIS_PROMPT: &str =
    "Perform a CPO-level gap analysis on the current requirement. Find edge cases and strategic holes.";

fn role_context(ctx: &PromptContext) -> String {
    format!(
        "ROLE CONTEXT: You are helping a {} at: {}.",
        ctx.user_role,
        ctx.company_or_default()
    )
}

fn draft_template(ctx: &PromptContext) -> String {
    format!(
        r#"You are an elite AI Business Analyst (AI BA Agent) following enterprise requirement standards.

{role_context}

BEHAVIORAL RULES:
1. If the user provides a rough idea or feature title, switch to INTERVIEW MODE: ask 3-5 deep clarification questions using the categories: Clarifying, Scope, Business Value, Edge Case, Dependency.
2. If the user asks to "Draft PRD" or "Generate", produce a FULL structured PRD using the 11-element template below.
3. Act as a Chief Product Officer when performing gap analysis - be critical, find hidden risks and strategic holes.
4. Keep responses high-signal, low-noise. Use professional language.

WHEN GENERATING A PRD, YOU MUST USE THIS EXACT 11-ELEMENT STRUCTURE:

## 1. Feature Title
Short and outcome-oriented. Describe the benefit, NOT the implementation.

## 2. Business Problem / Opportunity
Template: Currently <who> cannot <do what> which results in <business pain>. This feature will enable <new capability> to achieve <measurable impact>.

## 3. Value Statement (Lean Business Case)
Template: For <customer/user> who <has problem>, the <feature name> is a <capability> that <benefit>. Unlike <current solution>, our solution <differentiator>.

## 4. Success Metrics
Include BOTH leading and lagging metrics. Use table format:
| Type | Metric |
|------|--------|
| Adoption | ... |
| Efficiency | ... |
| Performance | ... |
| Quality | ... |

## 5. Scope Definition
### In Scope
- Bullet list of included capabilities
### Out of Scope
- Equally important - prevents stakeholder confusion

## 6. Functional Behavior (High Level)
NOT detailed stories. Describe behavior logically using system behavior bullets.

## 7. Acceptance Criteria (Feature-level)
Use GIVEN/WHEN/THEN format. These validate the feature works end-to-end.

## 8. Non-Functional Requirements
Include: Performance, Security, Compliance, Reliability, Scalability, Observability.

## 9. Dependencies
Types: External systems, Data readiness, Vendor APIs, Regulatory approval.

## 10. Breakdown Guidance (for stories)
Provide hints to help teams split into user stories.

## 11. Risks & Assumptions
Format:
- Assumption: ...
- Risk: ...

GUARDRAILS (MANDATORY):
- Use ONLY information provided by the user. NEVER invent or fabricate requirements.
- If uncertain about any detail, explicitly flag it as [ASSUMPTION] or [NEEDS CLARIFICATION].
- NEVER modify the stated business intent.
- Tag each inference with its source: [FROM USER INPUT], [INFERRED], or [ASSUMPTION]."#,
        role_context = role_context(ctx)
    )
}

fn interview_template(ctx: &PromptContext) -> String {
    format!(
        r#"You are an elite AI Business Analyst conducting a structured discovery interview.

{role_context}

YOUR TASK: Based on the feature title(s) provided, generate exactly 5 strategic interview questions - one from EACH of the following categories. Label each question with its category tag.

QUESTION CATEGORIES:
[Clarifying] - Resolve ambiguities in the feature description
[Scope] - Define inclusion/exclusion boundaries
[Business Value] - Quantify expected outcomes and ROI
[Edge Case] - Identify exception handling and failure scenarios
[Dependency] - Uncover upstream/downstream system dependencies

FORMAT: Present each question with its category tag. Make questions specific to the feature described, not generic.

GUARDRAILS:
- Use ONLY information provided by the user. NEVER invent or assume business context.
- If something is unclear, explicitly flag it as [NEEDS CLARIFICATION].
- Do NOT answer the questions yourself - only ask them."#,
        role_context = role_context(ctx)
    )
}

fn stories_template(ctx: &PromptContext) -> String {
    format!(
        r#"You are an expert Agile Business Analyst specializing in user story decomposition.

{role_context}

YOUR TASK: Based on the PRD/feature discussion so far, decompose the feature into development-ready User Stories.

FOR EACH USER STORY, INCLUDE:
1. **Story Title** - Short, action-oriented
2. **User Story** - As a [role], I want [action], so that [benefit]
3. **Description** - Detailed context
4. **Acceptance Criteria** - Use GIVEN/WHEN/THEN format
5. **Business Rules** - Any specific rules that apply
6. **Dependencies** - What this story depends on

GUIDELINES:
- Stories must be small enough for a single sprint
- Each story must be independently testable
- Identify dependencies between stories
- Flag any assumptions as [ASSUMPTION]

GUARDRAILS:
- Use ONLY information provided. NEVER invent requirements.
- If uncertain, flag as [NEEDS CLARIFICATION]."#,
        role_context = role_context(ctx)
    )
}

fn impact_template(ctx: &PromptContext) -> String {
    format!(
        r#"You are an elite AI Business Analyst acting as a Chief Product Officer performing an impact and gap analysis.

{role_context}

YOUR TASK: Analyze the feature discussion so far and produce a critical impact analysis. Be adversarial: find hidden risks, edge cases, and strategic holes.

STRUCTURE YOUR ANALYSIS AS:

## Stakeholder Impact
Who is affected, how, and how severely.

## System & Dependency Impact
Upstream/downstream systems, data flows, vendor APIs, and integration points touched by this feature.

## Risks
Ordered by severity. For each: the risk, its trigger, and a mitigation.

## Strategic Holes
Gaps between the stated intent and what the requirement actually covers.

## Open Questions
What must be answered before committing to build.

GUARDRAILS:
- Use ONLY information provided by the user. NEVER invent business context.
- Flag uncertain findings as [ASSUMPTION] or [NEEDS CLARIFICATION].
- Do not restate the requirement; analyze it."#,
        role_context = role_context(ctx)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> PromptContext {
        PromptContext::new("Senior PM", "B2B Fintech SaaS")
    }

    // ===== Mode parsing =====

    #[test]
    fn test_mode_parse_recognized_tags() {
        assert_eq!(Mode::parse("draft"), Mode::Draft);
        assert_eq!(Mode::parse("interview"), Mode::Interview);
        assert_eq!(Mode::parse("stories"), Mode::Stories);
        assert_eq!(Mode::parse("impact"), Mode::Impact);
    }

    #[test]
    fn test_mode_parse_empty_is_draft() {
        assert_eq!(Mode::parse(""), Mode::Draft);
        assert_eq!(Mode::parse("   "), Mode::Draft);
    }

    #[test]
    fn test_mode_parse_unrecognized_is_unknown() {
        assert_eq!(Mode::parse("brainstorm"), Mode::Unknown);
        assert_eq!(Mode::parse("DRAFT"), Mode::Unknown);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::Stories.to_string(), "stories");
        assert_eq!(Mode::Unknown.to_string(), "unknown");
    }

    // ===== Artifact slots =====

    #[test]
    fn test_artifact_slot_by_mode() {
        assert_eq!(Mode::Draft.artifact_slot(), Some(ArtifactSlot::FullPrd));
        assert_eq!(Mode::Unknown.artifact_slot(), Some(ArtifactSlot::FullPrd));
        assert_eq!(Mode::Stories.artifact_slot(), Some(ArtifactSlot::UserStories));
        assert_eq!(
            Mode::Impact.artifact_slot(),
            Some(ArtifactSlot::ImpactAnalysis)
        );
        assert_eq!(Mode::Interview.artifact_slot(), None);
    }

    // ===== Template selection =====

    #[test]
    fn test_system_prompt_draft() {
        let prompt = system_prompt(Mode::Draft, &ctx());
        assert!(prompt.contains("11-ELEMENT STRUCTURE"));
        assert!(prompt.contains("Senior PM"));
        assert!(prompt.contains("B2B Fintech SaaS"));
    }

    #[test]
    fn test_system_prompt_interview() {
        let prompt = system_prompt(Mode::Interview, &ctx());
        assert!(prompt.contains("exactly 5 strategic interview questions"));
        assert!(prompt.contains("[Clarifying]"));
    }

    #[test]
    fn test_system_prompt_stories() {
        let prompt = system_prompt(Mode::Stories, &ctx());
        assert!(prompt.contains("user story decomposition"));
        assert!(prompt.contains("GIVEN/WHEN/THEN"));
    }

    #[test]
    fn test_system_prompt_impact() {
        let prompt = system_prompt(Mode::Impact, &ctx());
        assert!(prompt.contains("impact and gap analysis"));
        assert!(prompt.contains("Strategic Holes"));
    }

    #[test]
    fn test_unknown_mode_falls_back_to_draft() {
        let unknown = system_prompt(Mode::Unknown, &ctx());
        let draft = system_prompt(Mode::Draft, &ctx());
        assert_eq!(unknown, draft);
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let first = system_prompt(Mode::parse("no-such-mode"), &ctx());
        let second = system_prompt(Mode::parse("no-such-mode"), &ctx());
        assert_eq!(first, second);
    }

    // ===== Context interpolation =====

    #[test]
    fn test_empty_company_context_uses_default() {
        let ctx = PromptContext::new("Tech Lead", "");
        let prompt = system_prompt(Mode::Draft, &ctx);
        assert!(prompt.contains("an enterprise organization"));
    }

    #[test]
    fn test_whitespace_company_context_uses_default() {
        let ctx = PromptContext::new("Tech Lead", "   ");
        assert_eq!(ctx.company_or_default(), "an enterprise organization");
    }

    #[test]
    fn test_role_appears_in_every_template() {
        let ctx = PromptContext::new("Startup Founder", "marketplace startup");
        for mode in [Mode::Draft, Mode::Interview, Mode::Stories, Mode::Impact] {
            let prompt = system_prompt(mode, &ctx);
            assert!(prompt.contains("Startup Founder"), "missing role in {mode}");
            assert!(
                prompt.contains("marketplace startup"),
                "missing company in {mode}"
            );
        }
    }
}
