use super::*;
use pretty_assertions::assert_eq;

#[test]
fn print_continues_the_current_line() {
    let handler = buffer_handler();
    handler.print("a");
    handler.print("b");
    handler.println("c");
    handler.println("");
    assert_eq!(handler.get_output(), "abc\n\n");
}

#[test]
fn clear_starts_a_fresh_capture() {
    let handler = buffer_handler();
    handler.println("first run");
    handler.clear();
    handler.print("second");
    assert_eq!(handler.get_output(), "second");
}

#[test]
fn lines_from_worker_threads_stay_whole() {
    // Generator bodies print from their own threads into the same handler.
    let handler = buffer_handler();
    let workers: Vec<_> = (0..4)
        .map(|n| {
            let handler = Arc::clone(&handler);
            std::thread::spawn(move || {
                for _ in 0..25 {
                    handler.println(&format!("worker {n}"));
                }
            })
        })
        .collect();
    for worker in workers {
        assert!(worker.join().is_ok());
    }

    let output = handler.get_output();
    assert_eq!(output.lines().count(), 100);
    assert!(output.lines().all(|line| line.starts_with("worker ")));
}

#[test]
fn non_capturing_handlers_report_nothing() {
    for handler in [stdout_handler(), stderr_handler(), silent_handler()] {
        handler.print("");
        assert_eq!(handler.get_output(), "");
    }
}
