//! Canned answers until the webhook is backed by a language model.

const ASSIGNMENTS: &str = "Your upcoming assignments can be found in the course modules. Each assignment has details \
                           about requirements and due dates. Let me know if you need help with a specific assignment!";
const DEADLINES: &str = "Assignment due dates are listed in each assignment's details. I recommend setting calendar \
                         reminders a few days before each deadline to manage your time effectively.";
const MODULES: &str = "The course is divided into several modules, each containing lecture materials, readings, and \
                       assignments. You can progress through them at your own pace, but make sure to complete \
                       assignments by their due dates.";
const INSTRUCTOR: &str = "Your instructor is available during office hours and via the messaging system. For specific \
                          questions about grading or course policies, I recommend contacting them directly.";
const FALLBACK: &str = "I'm here to help you with any questions about the course. You can ask about assignments, due \
                        dates, course materials, or anything else related to the course content.";

const RULES: [(&[&str], &str); 4] = [
    (&["assignment", "homework"], ASSIGNMENTS),
    (&["deadline", "due date"], DEADLINES),
    (&["module", "lecture"], MODULES),
    (&["instructor", "professor", "teacher"], INSTRUCTOR),
];

/// Picks the answer of the first rule whose keyword occurs in the message. An empty message is
/// answered with the greeting.
#[must_use]
pub fn keyword_reply<'a>(message: &str, greeting: &'a str) -> &'a str {
    if message.trim().is_empty() {
        return greeting;
    }
    let message = message.to_lowercase();
    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| message.contains(*keyword)))
        .map_or(FALLBACK, |(_, reply)| *reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREETING: &str = "Hi there";

    #[test]
    fn test_empty_message_greets() {
        assert_eq!(keyword_reply("", GREETING), GREETING);
        assert_eq!(keyword_reply("   ", GREETING), GREETING);
    }

    #[test]
    fn test_keywords() {
        assert_eq!(keyword_reply("Where is my HOMEWORK?", GREETING), ASSIGNMENTS);
        assert_eq!(keyword_reply("what is the due date", GREETING), DEADLINES);
        assert_eq!(keyword_reply("Which lecture covers traits?", GREETING), MODULES);
        assert_eq!(keyword_reply("Can I talk to the professor?", GREETING), INSTRUCTOR);
        assert_eq!(keyword_reply("hello", GREETING), FALLBACK);
    }

    #[test]
    fn test_rule_order() {
        // "assignment" wins over "deadline"
        assert_eq!(keyword_reply("assignment deadline", GREETING), ASSIGNMENTS);
        assert_eq!(keyword_reply("module deadline", GREETING), DEADLINES);
    }
}
