//! Role and ownership policy.
//!
//! The policy is a closed table keyed by (entity, action, role). Each entry
//! either denies or yields the row predicate the store must apply.

use uuid::Uuid;

use super::AuthzError;
use crate::models::{AssignmentStatus, FeedbackStatus, Role};

/// The authenticated caller, as far as authorization is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }
}

/// Lifecycle state a row must be in for the operation to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    Assignment(AssignmentStatus),
    Feedback(FeedbackStatus),
}

impl RowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowState::Assignment(s) => s.as_str(),
            RowState::Feedback(s) => s.as_str(),
        }
    }
}

/// Row filter produced by [`decide`].
///
/// All present conditions must hold. An empty predicate matches every row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Predicate {
    /// The row's owner must be this identity.
    pub owner: Option<Uuid>,
    /// The row's grading teacher must be unset or this identity.
    pub claimable_by: Option<Uuid>,
    /// The row's grading teacher must be this identity.
    pub graded_by: Option<Uuid>,
    /// The row must be in this state.
    pub state: Option<RowState>,
}

impl Predicate {
    /// Matches every row.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn owned_by(actor: Uuid) -> Self {
        Self {
            owner: Some(actor),
            ..Self::default()
        }
    }

    pub fn claimable_by(actor: Uuid) -> Self {
        Self {
            claimable_by: Some(actor),
            ..Self::default()
        }
    }

    pub fn graded_by(actor: Uuid) -> Self {
        Self {
            graded_by: Some(actor),
            ..Self::default()
        }
    }

    /// Narrow the predicate to rows in `state`.
    pub fn in_state(mut self, state: RowState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialAction {
    Read,
    /// The caller's own materials (dashboard view).
    ListOwn,
    Create,
    Update,
    AttachVideo,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentAction {
    Read,
    Create,
    Grade,
    Update,
    Delete,
    ListPending,
    ListGraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackAction {
    Read,
    Create,
    Update,
    Respond,
    Delete,
    ListByStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    List,
    Stats,
    Create,
    Update,
    Delete,
    ReadProfile,
    UpdateProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Material(MaterialAction),
    Assignment(AssignmentAction),
    Feedback(FeedbackAction),
    User(UserAction),
}

impl From<MaterialAction> for Action {
    fn from(action: MaterialAction) -> Self {
        Action::Material(action)
    }
}

impl From<AssignmentAction> for Action {
    fn from(action: AssignmentAction) -> Self {
        Action::Assignment(action)
    }
}

impl From<FeedbackAction> for Action {
    fn from(action: FeedbackAction) -> Self {
        Action::Feedback(action)
    }
}

impl From<UserAction> for Action {
    fn from(action: UserAction) -> Self {
        Action::User(action)
    }
}

const PENDING: RowState = RowState::Assignment(AssignmentStatus::Pending);
const GRADED: RowState = RowState::Assignment(AssignmentStatus::Graded);
const OPEN: RowState = RowState::Feedback(FeedbackStatus::Open);

/// Decide whether `actor` may perform `action`, and on which rows.
pub fn decide(actor: &Actor, action: impl Into<Action>) -> Result<Predicate, AuthzError> {
    let action = action.into();
    let decision = match action {
        Action::Material(action) => material(actor, action),
        Action::Assignment(action) => assignment(actor, action),
        Action::Feedback(action) => feedback(actor, action),
        Action::User(action) => user(actor, action),
    };

    if decision.is_none() {
        tracing::debug!(
            actor_id = %actor.id,
            role = %actor.role,
            action = ?action,
            "Authorization denied"
        );
    }

    decision.ok_or_else(|| denial_for(action))
}

fn material(actor: &Actor, action: MaterialAction) -> Option<Predicate> {
    use MaterialAction::*;
    use Role::*;

    match (action, actor.role) {
        (Read, _) => Some(Predicate::unrestricted()),
        (Create, Teacher | Admin) => Some(Predicate::unrestricted()),
        (ListOwn | Update | AttachVideo | Delete, Teacher) => Some(Predicate::owned_by(actor.id)),
        (ListOwn | Update | AttachVideo | Delete, Admin) => Some(Predicate::unrestricted()),
        (ListOwn | Create | Update | AttachVideo | Delete, Student) => None,
    }
}

fn assignment(actor: &Actor, action: AssignmentAction) -> Option<Predicate> {
    use AssignmentAction::*;
    use Role::*;

    match (action, actor.role) {
        (Read, Student) => Some(Predicate::owned_by(actor.id)),
        (Read, Teacher) => Some(Predicate::claimable_by(actor.id)),
        (Read, Admin) => Some(Predicate::unrestricted()),

        (Create, Student) => Some(Predicate::unrestricted()),
        (Create, Teacher | Admin) => None,

        (Grade, Teacher) => Some(Predicate::claimable_by(actor.id)),
        (Grade, Admin) => Some(Predicate::unrestricted()),
        (Grade, Student) => None,

        (Update, Student) => Some(Predicate::owned_by(actor.id).in_state(PENDING)),
        (Update, Teacher | Admin) => None,

        (Delete, Student) => Some(Predicate::owned_by(actor.id).in_state(PENDING)),
        (Delete, Admin) => Some(Predicate::unrestricted()),
        (Delete, Teacher) => None,

        (ListPending, Teacher) => Some(Predicate::claimable_by(actor.id).in_state(PENDING)),
        (ListPending, Admin) => Some(Predicate::unrestricted().in_state(PENDING)),
        (ListPending, Student) => None,

        (ListGraded, Teacher) => Some(Predicate::graded_by(actor.id).in_state(GRADED)),
        (ListGraded, Admin) => Some(Predicate::unrestricted().in_state(GRADED)),
        (ListGraded, Student) => None,
    }
}

fn feedback(actor: &Actor, action: FeedbackAction) -> Option<Predicate> {
    use FeedbackAction::*;
    use Role::*;

    match (action, actor.role) {
        (_, Teacher) => None,

        (Read, Student) => Some(Predicate::owned_by(actor.id)),
        (Read, Admin) => Some(Predicate::unrestricted()),

        (Create, Student) => Some(Predicate::unrestricted()),
        (Create, Admin) => None,

        (Update, Student) => Some(Predicate::owned_by(actor.id).in_state(OPEN)),
        (Update, Admin) => None,

        (Respond, Admin) => Some(Predicate::unrestricted()),
        (Respond, Student) => None,

        (Delete, Student) => Some(Predicate::owned_by(actor.id).in_state(OPEN)),
        (Delete, Admin) => Some(Predicate::unrestricted()),

        (ListByStatus, Admin) => Some(Predicate::unrestricted()),
        (ListByStatus, Student) => None,
    }
}

fn user(actor: &Actor, action: UserAction) -> Option<Predicate> {
    use UserAction::*;

    match action {
        ReadProfile | UpdateProfile => Some(Predicate::owned_by(actor.id)),
        List | Stats | Create | Update | Delete => {
            actor.role.is_admin().then(Predicate::unrestricted)
        }
    }
}

fn denial_for(action: Action) -> AuthzError {
    let reason = match action {
        Action::Material(MaterialAction::Create) => "Only teachers and admins can create materials",
        Action::Material(_) => "Only the owning teacher or an admin can modify this material",
        Action::Assignment(AssignmentAction::Create) => "Only students can submit assignments",
        Action::Assignment(AssignmentAction::Update) => {
            "Only the submitting student can edit an assignment"
        }
        Action::Assignment(AssignmentAction::Delete) => {
            "Only the submitting student or an admin can delete an assignment"
        }
        Action::Assignment(_) => "Only teachers and admins can review assignments",
        Action::Feedback(FeedbackAction::Respond | FeedbackAction::ListByStatus) => {
            "Only admins can manage feedback"
        }
        Action::Feedback(_) => "Feedback is only available to students and admins",
        Action::User(_) => "Admin access required",
    };
    AuthzError::access_denied(reason)
}
