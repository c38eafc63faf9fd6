use search_core::{DocId, DocumentStatus, RequestQueue, SearchServer, REQUEST_WINDOW};

fn animals() -> SearchServer {
    let mut server = SearchServer::new("and in at").unwrap();
    server.add_document(1, "curly cat curly tail", DocumentStatus::Actual, &[7, 2, 7]).unwrap();
    server.add_document(2, "curly dog and fancy collar", DocumentStatus::Actual, &[1, 2, 3]).unwrap();
    server.add_document(3, "big cat fancy collar", DocumentStatus::Actual, &[1, 2, 8]).unwrap();
    server.add_document(4, "big dog sparrow Eugene", DocumentStatus::Actual, &[1, 3, 2]).unwrap();
    server.add_document(5, "big dog sparrow Vasiliy", DocumentStatus::Actual, &[1, 1, 1]).unwrap();
    server
}

#[test]
fn window_keeps_the_last_day_of_requests() {
    let server = animals();
    let mut queue = RequestQueue::new(&server);
    for _ in 0..1439 {
        queue.add_find_request("empty request").unwrap();
    }
    queue.add_find_request("curly dog").unwrap();
    assert_eq!(queue.no_result_requests(), 1439);
    queue.add_find_request("big collar").unwrap();
    assert_eq!(queue.no_result_requests(), 1438);
    queue.add_find_request("sparrow").unwrap();
    assert_eq!(queue.no_result_requests(), 1437);
    assert_eq!(queue.query_size(), REQUEST_WINDOW);
}

#[test]
fn first_request_falls_out_after_1441_queries() {
    let server = animals();
    let mut queue = RequestQueue::new(&server);
    queue.add_find_request("curly cat").unwrap();
    assert!(queue.result_by_request_number(1).is_some());
    for _ in 0..1440 {
        queue.add_find_request("sparrow").unwrap();
    }
    assert_eq!(queue.query_size(), 1440);
    assert!(queue.result_by_request_number(1).is_none());
    let (query, results) = queue.result_by_request_number(1441).unwrap();
    assert_eq!(query, "sparrow");
    assert_eq!(results.iter().map(|d| d.id).collect::<Vec<_>>(), vec![4, 5]);
    assert!(queue.result_by_request_number(1442).is_none());
}

#[test]
fn filtered_requests_are_recorded() {
    let server = animals();
    let mut queue = RequestQueue::new(&server);
    let banned = queue.add_find_request_by("cat", DocumentStatus::Banned).unwrap();
    assert!(banned.is_empty());
    let rated = queue.add_find_request_by("cat", |_: DocId, _: DocumentStatus, rating: i32| rating > 4).unwrap();
    assert_eq!(rated.iter().map(|d| d.id).collect::<Vec<_>>(), vec![1]);
    assert_eq!(queue.no_result_requests(), 1);
}
