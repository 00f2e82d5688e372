use blogstore_core::{
    BlogService, ErrorKind, Paging, PostCreateInput, PostFilter, PostListQuery, PostUpdateInput,
    Store, StoreConfig, TagRef,
};
use std::sync::Arc;
use std::thread;

fn draft(title: &str, tags: Vec<TagRef>) -> PostCreateInput {
    PostCreateInput {
        title: title.to_string(),
        content: format!("# {title}"),
        created_at: 1_700_000_000_000,
        updated_at: 1_700_000_000_000,
        is_draft: false,
        tags,
    }
}

#[test]
fn service_covers_tag_and_post_lifecycle() {
    let store = Store::open_in_memory().unwrap();
    let service = BlogService::new(&store);

    let website = service.tag_create("website").unwrap();
    let tech = service.tag_create("technology").unwrap();
    assert_eq!(service.tag_count("").unwrap(), 2);

    let post = service
        .post_create(&draft(
            "Hello World",
            vec![TagRef::from(&website), TagRef::from(&tech)],
        ))
        .unwrap();
    assert_eq!(service.post_get_by_slug("hello-world").unwrap(), post);
    assert_eq!(service.post_get(post.id).unwrap(), post);

    let query = PostListQuery::parse("hello", "website;technology", "10", "1").unwrap();
    assert_eq!(service.post_count(&query.filter).unwrap(), 1);
    assert_eq!(service.post_list(&query).unwrap()[0].id, post.id);
    assert_eq!(
        service.post_list_with_content(&query).unwrap()[0].content,
        "# Hello World"
    );

    let renamed = service.tag_update(tech.id, "tech").unwrap();
    assert_eq!(renamed.name, "tech");
    let tagged_old_name = PostFilter::new("", vec!["technology".to_string()]);
    assert_eq!(service.post_count(&tagged_old_name).unwrap(), 0);

    let updated = service
        .post_update(&PostUpdateInput::from_create(
            post.id,
            draft("Hello Again", vec![TagRef::from(&renamed)]),
        ))
        .unwrap();
    assert_eq!(updated.slug, "hello-again");
    assert_eq!(updated.tags, vec![renamed]);

    assert_eq!(service.tag_remove(website.id).unwrap(), website.id);
    assert_eq!(service.post_remove(post.id).unwrap(), post.id);
    assert_eq!(service.post_count(&PostFilter::default()).unwrap(), 0);
    assert_eq!(
        service.post_get(post.id).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(service.tag_list("", Paging::default()).unwrap().len(), 1);
}

#[test]
fn service_passes_errors_through_unchanged() {
    let store = Store::open_in_memory().unwrap();
    let service = BlogService::new(&store);

    assert_eq!(
        service.tag_create(" ").unwrap_err().kind(),
        ErrorKind::Validation
    );
    assert_eq!(
        service.post_get_by_slug("nope").unwrap_err().kind(),
        ErrorKind::NotFound
    );

    // The guard from a failed call must not keep the store locked.
    assert_eq!(service.tag_count("").unwrap(), 0);
}

#[test]
fn concurrent_callers_share_one_store() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("blog.db").display());
    let store = Arc::new(Store::open(&StoreConfig::new(url)).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let service = BlogService::new(&store);
                for idx in 0..5 {
                    service
                        .post_create(&draft(&format!("worker {worker} post {idx}"), Vec::new()))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let service = BlogService::new(&store);
    assert_eq!(service.post_count(&PostFilter::default()).unwrap(), 20);
    let first_page = service
        .post_list(&PostListQuery {
            filter: PostFilter::new("worker 2", Vec::new()),
            paging: Paging::default(),
        })
        .unwrap();
    assert_eq!(first_page.len(), 5);
}
