#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use sea_orm::{
        DatabaseBackend, DbErr, EntityTrait, JoinType, MockDatabase, QueryFilter, QuerySelect,
        QueryTrait, RelationTrait, RuntimeErr, Value,
    };
    use uuid::Uuid;

    use crate::database::entity::{category, post};
    use crate::database::postgres_base::write_error;
    use crate::database::postgres_repo::{
        PostgresCategoryRepository, PostgresCommentRepository, PostgresPostRepository,
        post_condition,
    };
    use blog_core::domain::Post;
    use blog_core::error::RepoError;
    use blog_core::ports::{BaseRepository, CategoryRepository, CommentRepository, PostRepository};
    use blog_core::query::{PageRequest, PostFilter};

    fn post_model(id: Uuid, title: &str) -> post::Model {
        let now = Utc::now();
        post::Model {
            id,
            author_id: Uuid::new_v4(),
            title: title.to_owned(),
            text: "Content".to_owned(),
            pub_date: (now - Duration::hours(1)).into(),
            is_published: true,
            category_id: None,
            location_id: None,
            image: None,
            created_at: now.into(),
        }
    }

    #[tokio::test]
    async fn test_find_post_by_id() {
        let post_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post_model(post_id, "Test Post")]])
            .into_connection();

        let repo = PostgresPostRepository::new(Arc::new(db));

        let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

        let post = result.unwrap();
        assert_eq!(post.title, "Test Post");
        assert_eq!(post.id, post_id);
        assert!(post.category_id.is_none());
    }

    #[tokio::test]
    async fn test_list_posts_reports_total_and_page() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([(
                "num_items".to_owned(),
                Value::from(12i64),
            )])]])
            .append_query_results([vec![
                post_model(first, "Newest"),
                post_model(second, "Older"),
            ]])
            .into_connection();

        let repo = PostgresPostRepository::new(Arc::new(db));

        let page = repo
            .list(&PostFilter::live(Utc::now()), PageRequest::new(2, 2))
            .await
            .unwrap();

        assert_eq!(page.total, 12);
        assert_eq!(page.page, 2);
        let ids: Vec<Uuid> = page.items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[tokio::test]
    async fn test_find_category_by_slug() {
        let category_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![category::Model {
                id: category_id,
                title: "Travel".to_owned(),
                description: "Trips".to_owned(),
                slug: "travel".to_owned(),
                is_published: false,
                created_at: Utc::now().into(),
            }]])
            .into_connection();

        let repo = PostgresCategoryRepository::new(Arc::new(db));

        let category = repo.find_by_slug("travel").await.unwrap().unwrap();
        assert_eq!(category.id, category_id);
        assert!(!category.is_published);
    }

    #[tokio::test]
    async fn test_count_comments_by_post() {
        let busy = Uuid::new_v4();
        let quiet = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([
                ("post_id".to_owned(), Value::from(busy)),
                ("comment_count".to_owned(), Value::from(3i64)),
            ])]])
            .into_connection();

        let repo = PostgresCommentRepository::new(Arc::new(db));

        let counts = repo.count_by_posts(&[busy, quiet]).await.unwrap();
        assert_eq!(counts.get(&busy), Some(&3));
        assert_eq!(counts.get(&quiet), None);
    }

    #[tokio::test]
    async fn test_count_comments_skips_query_without_posts() {
        // No query results appended: any query would fail.
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = PostgresCommentRepository::new(Arc::new(db));

        assert!(repo.count_by_posts(&[]).await.unwrap().is_empty());
    }

    fn where_clause(filter: &PostFilter) -> String {
        let sql = post::Entity::find()
            .join(JoinType::LeftJoin, post::Relation::Category.def())
            .filter(post_condition(filter))
            .build(DatabaseBackend::Postgres)
            .to_string();
        assert!(sql.contains("LEFT JOIN \"categories\""));
        sql.split_once("WHERE")
            .map(|(_, clause)| clause.to_owned())
            .unwrap_or_default()
    }

    #[test]
    fn test_live_filter_allows_missing_category() {
        let clause = where_clause(&PostFilter::live(Utc::now()));

        assert!(clause.contains("\"posts\".\"is_published\" ="));
        assert!(clause.contains("\"posts\".\"pub_date\" <="));
        assert!(clause.contains("\"posts\".\"category_id\" IS NULL OR \"categories\".\"is_published\" ="));
    }

    #[test]
    fn test_owner_filter_has_no_visibility_clause() {
        let author = Uuid::new_v4();
        let clause = where_clause(&PostFilter::all().by_author(author));

        assert!(clause.contains("\"posts\".\"author_id\" ="));
        assert!(!clause.contains("is_published"));
        assert!(!clause.contains("pub_date"));
    }

    #[test]
    fn test_write_errors_keep_their_kind() {
        let check = DbErr::Exec(RuntimeErr::Internal(
            "new row for relation \"categories\" violates check constraint \"ck_categories_slug\""
                .to_string(),
        ));
        assert!(matches!(write_error(check), RepoError::Invalid(_)));

        let other = DbErr::Exec(RuntimeErr::Internal("syntax error".to_string()));
        assert!(matches!(write_error(other), RepoError::Query(_)));

        let conn = DbErr::Conn(RuntimeErr::Internal("refused".to_string()));
        assert!(matches!(write_error(conn), RepoError::Connection(_)));
    }
}
