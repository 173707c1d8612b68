//! Watermark scenarios with real workers
//!
//! Single producer, controlled consumption, tiny payloads.

use bufferline_core::application::{
    shutdown_channel, BoundedQueue, BoundedStringQueue, GeneratorSettings, PayloadGenerator,
    PayloadSizeRange, PipelineStats, ProducerWorker, WorkerSettings, WorkerState,
};
use bufferline_core::domain::QueueLimits;
use bufferline_core::port::segment_source::mocks::IndexedSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

fn tiny_producer(queue: Arc<BoundedStringQueue>) -> Arc<ProducerWorker> {
    let generator = PayloadGenerator::new(Arc::new(IndexedSource), GeneratorSettings::default()).unwrap();
    Arc::new(ProducerWorker::new(
        0,
        queue,
        Arc::new(generator),
        PayloadSizeRange::new(3, 3).unwrap(),
        WorkerSettings {
            max_pause: Duration::from_millis(1),
        },
        Arc::new(PipelineStats::new()),
    ))
}

async fn wait_for_size(queue: &BoundedStringQueue, size: usize) {
    timeout(Duration::from_secs(5), async {
        while queue.size() != size {
            sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("queue never reached {}, stuck at {}", size, queue.size()));
}

#[tokio::test]
async fn test_parked_producer_waits_for_low_watermark() {
    let queue = Arc::new(BoundedQueue::default());
    let producer = tiny_producer(queue.clone());
    let (tx, token) = shutdown_channel();
    let task = tokio::spawn({
        let producer = producer.clone();
        async move { producer.run(token).await }
    });

    wait_for_size(&queue, 100).await;
    sleep(Duration::from_millis(30)).await;
    assert_eq!(producer.state(), WorkerState::Working, "producer should be parked");

    // Drain to exactly 80: producer stays parked
    for _ in 0..20 {
        let item = queue.try_take().unwrap();
        assert_eq!(item, "ABC");
    }
    sleep(Duration::from_millis(50)).await;
    assert_eq!(queue.size(), 80);

    // 80 -> 79 releases it; it refills to capacity and parks again
    queue.try_take().unwrap();
    wait_for_size(&queue, 100).await;

    tx.shutdown();
    timeout(Duration::from_secs(1), task).await.unwrap().unwrap();
    assert_eq!(producer.state(), WorkerState::Stopped);
}

#[tokio::test]
async fn test_hundred_and_first_put_blocks_until_take() {
    let queue: BoundedStringQueue = BoundedQueue::new(QueueLimits::new(100, 100).unwrap());
    let generator = PayloadGenerator::new(Arc::new(IndexedSource), GeneratorSettings::default()).unwrap();

    for _ in 0..100 {
        queue.put(generator.generate(3).await.unwrap()).await.unwrap();
    }

    let extra = generator.generate(3).await.unwrap();
    let mut put = tokio_test::task::spawn(queue.put(extra));
    tokio_test::assert_pending!(put.poll());

    assert_eq!(queue.take().await.unwrap(), "ABC");
    assert!(put.is_woken());
    tokio_test::assert_ready_eq!(put.poll(), Ok(()));
    assert_eq!(queue.size(), 100);
}
