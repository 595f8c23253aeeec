use super::lang::Lang;

/// Prompt asking the model for comma-separated literature search terms.
pub fn term_prompt(idea: &str) -> String {
    format!(
        "You are an expert in experimental design and scientific literature search.
YOUR TASK: Given the following research idea, produce a list of OPTIMIZED SEARCH TERMS for a scholarly paper search API (such as Semantic Scholar).
The terms must be precise, relevant, and capture the key concepts of the idea. Return them as a single line of text separated by commas, with no other commentary.

IDEA: {idea}

SEARCH TERMS:"
    )
}

/// Prompt asking the model for the structured work plan, grounded on `literature`.
pub fn plan_prompt(idea: &str, literature: &str, lang: Lang) -> String {
    let prompt = format!(
        "You are an expert in experimental design. Your task is to produce a detailed, feasible work plan for the research idea below.

**RESEARCHER'S IDEA:**
{idea}

**RECENT SCIENTIFIC LITERATURE (abstracts of relevant papers):**
{literature}

**PLAN INSTRUCTIONS:**
Based on the idea and the literature provided, write a work plan with the following sections:

1.  **Tentative Project Title:** [Suggest a title based on the idea and the literature]
2.  **Introduction and State of the Art:** [Brief synthesis of the context, citing key findings from the abstracts where relevant]
3.  **Objectives:**
    - **General Objective:** [One]
    - **Specific Objectives:** [3-5]
4.  **Proposed Methodology (DETAILED):**
    - **Experimental Design:** [Study type, groups, replicates]
    - **Sample Preparation:** [Suggested protocol, equipment]
    - **Core Procedures:** [Key treatments or processes and their conditions]
    - **Assays and Measurements:** [Specific methods and readouts]
    - **Statistical Analysis:** [Software, tests to use]
5.  **Tentative Timeline:** [Split by quarters or months, with the main activities]
6.  **Required Resources:** [Reagents, equipment, software, personnel]

**Format:** Use **bold** for section titles (e.g. **4. Proposed Methodology**) and bulleted lists for items."
    );
    lang.apply_to_prompt(&prompt)
}
