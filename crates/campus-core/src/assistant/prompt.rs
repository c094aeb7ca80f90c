use campus_db::course::{assignment, content, module};
use campus_db::user;
use campus_entity::course::course::Model as Course;
use sea_orm::{ConnectionTrait, DbErr};
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentSummary {
    pub title: String,
    /// `%Y-%m-%d %H:%M` in UTC or `No due date`.
    pub due_date: String,
    pub points: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSummary {
    pub title: String,
    pub description: String,
    /// Title and kind (`text`, `file` or `url`) of each content item.
    pub contents: Vec<(String, String)>,
    pub assignments: Vec<AssignmentSummary>,
}

/// What the assistant knows about its course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseContext {
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub modules: Vec<ModuleSummary>,
}

impl CourseContext {
    pub async fn load<C: ConnectionTrait>(conn: &C, course: &Course) -> Result<Self, DbErr> {
        let instructor = user::Query::find_user_by_id(conn, course.instructor_id)
            .await?
            .map(|instructor| instructor.display_name())
            .unwrap_or_default();

        let mut modules = vec![];
        for module in module::Query::list_for_course(conn, course.id).await? {
            let contents = content::Query::list_for_module(conn, module.id)
                .await?
                .into_iter()
                .map(|content| (content.title, content.content_type.as_ref().to_owned()))
                .collect();
            let assignments = assignment::Query::list_for_module(conn, module.id)
                .await?
                .into_iter()
                .map(|assignment| AssignmentSummary {
                    due_date: assignment.due_date.map_or_else(
                        || "No due date".to_owned(),
                        |due_date| due_date.naive_utc().format("%Y-%m-%d %H:%M").to_string(),
                    ),
                    title: assignment.title,
                    points: assignment.points,
                })
                .collect();
            modules.push(ModuleSummary {
                title: module.title,
                description: module.description,
                contents,
                assignments,
            });
        }

        Ok(Self {
            title: course.title.clone(),
            description: course.description.clone(),
            instructor,
            modules,
        })
    }

    /// Renders the system prompt sent along with every reply.
    #[must_use]
    pub fn system_prompt(&self) -> String {
        let mut structure = String::new();
        for (i, module) in self.modules.iter().enumerate() {
            let _ = writeln!(structure, "Module {}: {}", i + 1, module.title);
            let _ = writeln!(structure, "  Description: {}", module.description);
            if !module.contents.is_empty() {
                structure.push_str("  Content Items:\n");
                for (j, (title, kind)) in module.contents.iter().enumerate() {
                    let _ = writeln!(structure, "    {}. {title} ({kind})", j + 1);
                }
            }
            if !module.assignments.is_empty() {
                structure.push_str("  Assignments:\n");
                for (j, assignment) in module.assignments.iter().enumerate() {
                    let _ = writeln!(
                        structure,
                        "    {}. {} (Due: {}, Points: {})",
                        j + 1,
                        assignment.title,
                        assignment.due_date,
                        assignment.points
                    );
                }
            }
            structure.push('\n');
        }

        format!(
            r#"
You are an AI assistant for the course "{title}" taught by {instructor}.
Your role is to help students with questions about the course content, assignments, and due dates.

Here is information about the course:
Description: {description}

Course Structure:
{structure}

Guidelines:
1. Be concise, friendly, and helpful.
2. If asked about assignment deadlines or points, provide the accurate information from the course data.
3. If asked about content not in the course data, politely explain that you can only provide information about this specific course.
4. Direct technical issues or grading questions to the instructor.
5. Maintain a supportive, educational tone throughout conversations.
6. If you need to refer to a file or URL content, mention that the student can access it in the course materials.

Your goal is to enhance the learning experience and provide accurate course information.
"#,
            title = self.title,
            instructor = self.instructor,
            description = self.description,
        )
    }
}
