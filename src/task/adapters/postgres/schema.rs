//! Diesel schema for task lifecycle persistence.

diesel::table! {
    /// Known user identities, maintained by the identity provider.
    users (id) {
        /// User identifier.
        id -> Uuid,
        /// Unique login name.
        #[max_length = 150]
        username -> Varchar,
        /// Registration timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Task records; rows are never physically removed.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Task title.
        #[max_length = 200]
        title -> Varchar,
        /// Task description, possibly empty.
        description -> Text,
        /// Lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Ordinal priority.
        #[max_length = 20]
        priority -> Varchar,
        /// Creating actor.
        created_by -> Uuid,
        /// Current assignee.
        assigned_to -> Nullable<Uuid>,
        /// Actor who performed the current assignment.
        assigned_by -> Nullable<Uuid>,
        /// Actor who closed the task.
        closed_by -> Nullable<Uuid>,
        /// Actor who deleted the task.
        deleted_by -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last mutation timestamp.
        updated_at -> Timestamptz,
        /// Current assignment timestamp.
        assigned_at -> Nullable<Timestamptz>,
        /// Closing timestamp.
        closed_at -> Nullable<Timestamptz>,
        /// Deletion timestamp.
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Append-only status transition log; insertion order is read order.
    task_history (id) {
        /// Storage sequence, assigned by the database.
        id -> Int8,
        /// Task the transition was applied to.
        task_id -> Uuid,
        /// Transition timestamp.
        changed_at -> Timestamptz,
        /// Actor who performed the transition.
        changed_by -> Uuid,
        /// Status before the transition.
        #[max_length = 20]
        previous_status -> Varchar,
        /// Status after the transition.
        #[max_length = 20]
        new_status -> Varchar,
        /// Assignee, set only for assignment transitions.
        assigned_to -> Nullable<Uuid>,
    }
}

diesel::table! {
    /// Append-only task comments; insertion order is read order.
    task_comments (id) {
        /// Storage sequence, assigned by the database.
        id -> Int8,
        /// Task the comment belongs to.
        task_id -> Uuid,
        /// Comment timestamp.
        commented_at -> Timestamptz,
        /// Comment author.
        commented_by -> Uuid,
        /// Comment body.
        comment -> Text,
    }
}

diesel::joinable!(task_history -> tasks (task_id));
diesel::joinable!(task_comments -> tasks (task_id));

diesel::allow_tables_to_appear_in_same_query!(users, tasks, task_history, task_comments);
