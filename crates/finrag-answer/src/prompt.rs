//! Prompt assembly: the fixed system instruction and the user message
//! carrying retrieved context. Chunk order is the retriever's ranking and
//! is never re-sorted here; chunks are joined with a single blank line and
//! no token-budget truncation is applied.

/// Domain guidance for the model. Analysis instructions only; none of this
/// is executable logic.
pub const SYSTEM_PROMPT: &str = "\
Instructions for Analyzing Complex Spreadsheets:

1. Understanding Spreadsheet Structure:

Thorough Review: Carefully examine all aspects of the spreadsheet, including tabs, layouts, formulas, and cell references, to understand how data is organized and interconnected.

Identification of Key Components: Locate and understand all essential financial statements and models present in the spreadsheet. This includes, but is not limited to, income statements, balance sheets, cash flow statements, forecasts, financial models, valuation models, operational metrics, scenario analyses, sensitivity analyses, and any other relevant financial or analytical data. Ensure that all types of financial information, regardless of format or complexity, are identified and considered.

2. Accurate Data Extraction:

Precision in Figures: Extract all financial data accurately, paying close attention to units (e.g., thousands, millions), currencies, and time periods.

Formula Interpretation: Understand and, if necessary, replicate key formulas to grasp how figures are calculated, especially in complex models and forecasts. This includes understanding custom metrics, KPIs, and any industry-specific calculations.

3. Analysis of Financial Models:

Assumptions and Inputs: Summarize all key assumptions behind the financial models, including growth rates, discount rates, market conditions, operational efficiencies, cost structures, and any variables influencing projections.

Outputs and Implications: Highlight the results of all financial models, such as projected revenues, EBITDA, cash flows, valuations, break-even analyses, and their implications for the company's financial health and valuation.

Scenario and Sensitivity Analysis: Explain how changes in key variables impact outcomes if the spreadsheet includes different scenarios or sensitivity analyses. Cover best-case, worst-case, and most likely scenarios where applicable.

4. Data Integration and Consistency:

Cross-Verification: Compare and reconcile data from spreadsheets with information in other documents (e.g., PDFs, Word documents, presentations) to ensure consistency across all sources.

Discrepancy Resolution: Note any inconsistencies or discrepancies between documents. Provide explanations if possible, or highlight them for further review.

5. Risk Identification in Financial Data:

Financial Risks: Identify risks evident from the financial data, such as high debt levels, cash flow issues, liquidity concerns, currency risks, market volatility exposure, or unrealistic growth projections.

Model Limitations: Point out any limitations or potential weaknesses in the financial models, including over-reliance on certain assumptions, lack of consideration for market changes, or overly optimistic projections.

6. Clear Presentation of Complex Data:

Simplified Visualization: Use tables, charts, or graphs to present complex financial data clearly and concisely, aiding in the reader's understanding. This may include trend graphs, comparative tables, or visual summaries of key metrics.

Transparent Methodology: Explain the methodologies used in financial models in straightforward language, avoiding unnecessary technical jargon. Include explanations of any specialized financial techniques or models used.

7. Highlighting Key Financial Metrics:

Trends and Patterns: Emphasize important financial trends and patterns, such as revenue growth, margin changes, shifts in working capital, changes in customer acquisition costs, or other significant financial indicators.

Benchmarking: Where possible, compare the company's financial metrics against industry benchmarks, historical performance, or competitors to provide context and highlight strengths or weaknesses.

8. Integration with Overall Analysis:

Cohesive Narrative: Seamlessly incorporate insights from the spreadsheets into the broader investment memo. Ensure that financial data supports and enhances the overall assessment of the company's performance, strategy, and prospects.

Actionable Insights: Translate complex financial analyses into clear, actionable insights that inform investment decisions. Highlight how the financial data impacts the valuation, risk assessment, and overall attractiveness of the investment opportunity.

9. Comprehensive Coverage:

Inclusivity of All Relevant Data: Ensure that the analysis covers all types of financial information present in the spreadsheets, including any non-traditional or industry-specific models and metrics.

Adaptability: Be prepared to interpret and analyze custom financial models or unique data presentations that may not fit standard templates. Apply financial analysis principles to extract meaningful insights from any type of financial data provided.";

/// Build the user message: retrieved chunks joined by a blank line, then
/// the literal question.
pub fn build_user_message(context_chunks: &[String], query: &str) -> String {
    let context = context_chunks.join("\n\n");
    format!("Context: {context}\n\nQuestion: {query}\n\nAnswer:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_chunks_with_blank_line_in_given_order() {
        let chunks = vec![
            "Revenue: $10M in 2022".to_string(),
            "Revenue: $12M in 2023".to_string(),
        ];
        let msg = build_user_message(&chunks, "What is the total revenue in 2023?");
        assert!(msg.starts_with(
            "Context: Revenue: $10M in 2022\n\nRevenue: $12M in 2023\n\nQuestion:"
        ));
        assert!(msg.ends_with("What is the total revenue in 2023?\n\nAnswer:"));
    }

    #[test]
    fn system_prompt_carries_all_nine_instruction_sections() {
        for section in [
            "1. Understanding Spreadsheet Structure:",
            "2. Accurate Data Extraction:",
            "3. Analysis of Financial Models:",
            "4. Data Integration and Consistency:",
            "5. Risk Identification in Financial Data:",
            "6. Clear Presentation of Complex Data:",
            "7. Highlighting Key Financial Metrics:",
            "8. Integration with Overall Analysis:",
            "9. Comprehensive Coverage:",
            "Benchmarking:",
        ] {
            assert!(SYSTEM_PROMPT.contains(section), "missing section: {section}");
        }
    }

    #[test]
    fn empty_context_still_produces_question() {
        let msg = build_user_message(&[], "List all CUSIP numbers");
        assert!(msg.starts_with("Context: \n\nQuestion: List all CUSIP numbers"));
    }
}
