/// Project management module
///
/// Projects, their leads, and role-scoped team assignments. Creating or
/// updating a project with its team is a single transactional workflow.

pub mod storage;
pub mod types;

pub use storage::ProjectStorage;
pub use types::{
    AddMemberRequest, CreateProjectRequest, Project, ProjectDetails, ProjectStatus,
    ProjectSummary, TeamAssignment, TeamMember, TeamRole, UpdateProjectRequest,
};
