use crate::category::Category;

/// Reply for questions that matched no category.
pub const FALLBACK_RESPONSE: &str = "I'm sorry, I didn't understand your question. Please ask about admissions, requirements, deadlines, fees, or application process.";

impl Category {
    /// Canned reply for this category.
    pub fn response(self) -> &'static str {
        match self {
            Category::Requirements => "You need to have completed 12th grade with minimum 75% marks and pass the entrance exam.",
            Category::Deadline => "The admission deadline is March 31st, 2026.",
            Category::Fee => "The application fee is $50 for domestic students and $100 for international students.",
            Category::Process => "Visit our official website, create an account, fill the application form, and submit required documents.",
            Category::Documents => "You need transcripts, ID proof, passport photo, and entrance exam scorecard.",
            Category::Greeting => "Hello! I'm your admission assistant. How can I help you today?",
            Category::Unknown => FALLBACK_RESPONSE,
        }
    }
}

/// Reply for a category label. Unrecognized labels get the fallback reply.
pub fn response_for(label: &str) -> &'static str {
    label
        .parse::<Category>()
        .map(Category::response)
        .unwrap_or(FALLBACK_RESPONSE)
}
